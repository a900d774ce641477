use std::collections::BTreeMap;

use serde::Serialize;
use titik_fiksi::escape_html;

/// Mount point ids shared by controllers and the page shell.
pub mod mounts {
    pub const BRAND_LOGO: &str = "brand-logo";

    pub const HERO_TITLE: &str = "hero-title";
    pub const HERO_SUBTITLE: &str = "hero-subtitle";
    pub const INTRO_TEXT: &str = "intro-text";
    pub const YOUTUBE_FRAME: &str = "youtube-frame";
    pub const SOCIAL_LINKS: &str = "social-links";

    pub const WORKS_CONTAINER: &str = "works-container";
    pub const WRITINGS_CONTAINER: &str = "writings-container";

    pub const NOVEL_DETAIL: &str = "novel-detail";
    pub const NOVEL_ERROR: &str = "novel-error";
    pub const NOVEL_TITLE: &str = "novel-title";
    pub const NOVEL_GENRE: &str = "novel-genre";
    pub const NOVEL_STATUS: &str = "novel-status";
    pub const NOVEL_SYNOPSIS: &str = "novel-synopsis";
    pub const NOVEL_COVER: &str = "novel-cover";
    pub const CHAPTERS_LIST: &str = "chapters-list";
    pub const CHAPTER_SEARCH: &str = "chapter-search";
    pub const SEARCH_SLUG: &str = "search-slug";
    pub const BTN_READ_FIRST: &str = "btn-read-first";

    pub const CHAPTER_BOX: &str = "chapter-box";
    pub const CHAPTER_ERROR: &str = "chapter-error";
    pub const CHAPTER_TOP: &str = "chapter-top";
    pub const CHAPTER_TITLE: &str = "chapter-title";
    pub const CHAPTER_CONTENT: &str = "chapter-content";
    pub const CHAPTER_LINKS: &str = "chapter-links";
    pub const BTN_BACK_NOVEL: &str = "btn-back-novel";
    pub const BTN_PREV: &str = "btn-prev";
    pub const BTN_NEXT: &str = "btn-next";

    pub const WRITING_BOX: &str = "writing-box";
    pub const WRITING_ERROR: &str = "writing-error";
    pub const WRITING_TITLE: &str = "writing-title";
    pub const WRITING_META: &str = "writing-meta";
    pub const WRITING_CONTENT: &str = "writing-content";
}

/// Bindings a controller produces for a page.
///
/// Mount contents are stored as ready HTML; attribute values are stored raw
/// and escaped when the shell writes them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageOutput {
    pub document_title: Option<String>,
    pub meta_description: Option<String>,
    pub favicon: Option<String>,
    pub mounts: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, BTreeMap<String, String>>,
    pub visibility: BTreeMap<String, bool>,
    /// Send the visitor elsewhere instead of rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl PageOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind trusted HTML to a mount.
    pub fn set_html(&mut self, id: &str, html: impl Into<String>) {
        self.mounts.insert(id.to_string(), html.into());
    }

    /// Bind plain text to a mount; it is escaped here.
    pub fn set_text(&mut self, id: &str, text: &str) {
        self.mounts.insert(id.to_string(), escape_html(text));
    }

    pub fn set_attr(&mut self, id: &str, attr: &str, value: impl Into<String>) {
        self.attributes
            .entry(id.to_string())
            .or_default()
            .insert(attr.to_string(), value.into());
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) {
        self.visibility.insert(id.to_string(), visible);
    }

    pub fn show(&mut self, id: &str) {
        self.set_visible(id, true);
    }

    pub fn hide(&mut self, id: &str) {
        self.set_visible(id, false);
    }

    /// Show an inline message in `id`. `html` must already be escaped.
    pub fn fail(&mut self, id: &str, html: impl Into<String>) {
        self.set_html(id, html);
        self.show(id);
    }

    pub fn html(&self, id: &str) -> Option<&str> {
        self.mounts.get(id).map(String::as_str)
    }

    pub fn attr(&self, id: &str, attr: &str) -> Option<&str> {
        self.attributes
            .get(id)
            .and_then(|attrs| attrs.get(attr))
            .map(String::as_str)
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.visibility.get(id).copied()
    }

    /// Fold `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: PageOutput) {
        if other.document_title.is_some() {
            self.document_title = other.document_title;
        }
        if other.meta_description.is_some() {
            self.meta_description = other.meta_description;
        }
        if other.favicon.is_some() {
            self.favicon = other.favicon;
        }
        if other.redirect.is_some() {
            self.redirect = other.redirect;
        }
        self.mounts.extend(other.mounts);
        for (id, attrs) in other.attributes {
            self.attributes.entry(id).or_default().extend(attrs);
        }
        self.visibility.extend(other.visibility);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_text_escapes_markup() {
        let mut out = PageOutput::new();
        out.set_text(mounts::NOVEL_TITLE, "<i>Senja</i>");
        assert_eq!(out.html(mounts::NOVEL_TITLE), Some("&lt;i&gt;Senja&lt;/i&gt;"));
    }

    #[test]
    fn merge_prefers_later_bindings() {
        let mut base = PageOutput::new();
        base.document_title = Some("Titik Fiksi".to_string());
        base.set_attr(mounts::BRAND_LOGO, "src", "a.png");
        base.hide(mounts::BTN_PREV);

        let mut page = PageOutput::new();
        page.set_attr(mounts::BRAND_LOGO, "alt", "logo");
        page.show(mounts::BTN_PREV);
        base.merge(page);

        assert_eq!(base.document_title.as_deref(), Some("Titik Fiksi"));
        assert_eq!(base.attr(mounts::BRAND_LOGO, "src"), Some("a.png"));
        assert_eq!(base.attr(mounts::BRAND_LOGO, "alt"), Some("logo"));
        assert_eq!(base.is_visible(mounts::BTN_PREV), Some(true));
    }
}
