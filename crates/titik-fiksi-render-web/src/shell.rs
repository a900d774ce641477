//! Built-in page shell: static markup for each route with the mount points
//! controllers bind into.

use titik_fiksi::escape_html;

use crate::output::{mounts, PageOutput};
use crate::router::Route;

const DEFAULT_TITLE: &str = "Titik Fiksi";

/// One element of the shell. `hidden` is the state before any binding.
struct Mount {
    id: &'static str,
    tag: &'static str,
    class: &'static str,
    attrs: &'static [(&'static str, &'static str)],
    hidden: bool,
    label: &'static str,
    children: &'static [Mount],
}

impl Mount {
    const fn new(id: &'static str, tag: &'static str) -> Self {
        Self {
            id,
            tag,
            class: "",
            attrs: &[],
            hidden: false,
            label: "",
            children: &[],
        }
    }

    const fn class(mut self, class: &'static str) -> Self {
        self.class = class;
        self
    }

    const fn attrs(mut self, attrs: &'static [(&'static str, &'static str)]) -> Self {
        self.attrs = attrs;
        self
    }

    const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    const fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    const fn children(mut self, children: &'static [Mount]) -> Self {
        self.children = children;
        self
    }

    fn is_void(&self) -> bool {
        matches!(self.tag, "img" | "input")
    }
}

const HEADER: &[Mount] = &[Mount::new(mounts::BRAND_LOGO, "img")
    .class("brand-logo")
    .attrs(&[("alt", "Titik Fiksi")])
    .hidden()];

const HOME: &[Mount] = &[
    Mount::new(mounts::HERO_TITLE, "h1").label(DEFAULT_TITLE),
    Mount::new(mounts::HERO_SUBTITLE, "p").class("hero-subtitle"),
    Mount::new(mounts::INTRO_TEXT, "p").class("intro-text"),
    Mount::new(mounts::YOUTUBE_FRAME, "iframe")
        .attrs(&[("title", "YouTube"), ("allowfullscreen", "")])
        .hidden(),
    Mount::new(mounts::SOCIAL_LINKS, "div").class("social-links"),
];

const WORKS: &[Mount] = &[Mount::new(mounts::WORKS_CONTAINER, "div")
    .class("works-grid")
    .label("Memuat...")];

const WRITINGS: &[Mount] = &[Mount::new(mounts::WRITINGS_CONTAINER, "div")
    .class("writings-list")
    .label("Memuat...")];

const SEARCH_FORM: &[Mount] = &[
    Mount::new(mounts::SEARCH_SLUG, "input").attrs(&[("type", "hidden"), ("name", "slug")]),
    Mount::new(mounts::CHAPTER_SEARCH, "input").attrs(&[
        ("type", "search"),
        ("name", "q"),
        ("placeholder", "Cari bab..."),
    ]),
];

const NOVEL_DETAIL: &[Mount] = &[
    Mount::new(mounts::NOVEL_COVER, "img").class("novel-cover"),
    Mount::new(mounts::NOVEL_TITLE, "h1"),
    Mount::new(mounts::NOVEL_GENRE, "span").class("badge"),
    Mount::new(mounts::NOVEL_STATUS, "span").class("badge"),
    Mount::new(mounts::NOVEL_SYNOPSIS, "p").class("novel-synopsis"),
    Mount::new(mounts::BTN_READ_FIRST, "a")
        .class("btn btn-primary")
        .label("📖 Baca Bab Pertama")
        .hidden(),
    Mount::new("chapter-search-form", "form")
        .attrs(&[("method", "get"), ("action", "novel.html")])
        .children(SEARCH_FORM),
    Mount::new(mounts::CHAPTERS_LIST, "div").class("chapters-list"),
];

const NOVEL: &[Mount] = &[
    Mount::new(mounts::NOVEL_ERROR, "div")
        .class("glass-card error")
        .hidden(),
    Mount::new(mounts::NOVEL_DETAIL, "section")
        .hidden()
        .children(NOVEL_DETAIL),
];

const CHAPTER_NAV: &[Mount] = &[
    Mount::new(mounts::BTN_PREV, "a")
        .class("btn btn-ghost")
        .label("← Sebelumnya")
        .hidden(),
    Mount::new(mounts::BTN_NEXT, "a")
        .class("btn btn-ghost")
        .label("Berikutnya →")
        .hidden(),
];

const CHAPTER_BOX: &[Mount] = &[
    Mount::new(mounts::CHAPTER_TOP, "div").class("chapter-top"),
    Mount::new(mounts::CHAPTER_TITLE, "h1"),
    Mount::new(mounts::CHAPTER_CONTENT, "div").class("chapter-content"),
    Mount::new(mounts::CHAPTER_LINKS, "div")
        .class("chapter-links")
        .hidden(),
    Mount::new("chapter-nav", "nav")
        .class("chapter-nav")
        .children(CHAPTER_NAV),
];

const CHAPTER: &[Mount] = &[
    Mount::new(mounts::BTN_BACK_NOVEL, "a")
        .class("btn btn-ghost")
        .label("← Kembali ke Novel"),
    Mount::new(mounts::CHAPTER_ERROR, "div")
        .class("glass-card error")
        .hidden(),
    Mount::new(mounts::CHAPTER_BOX, "article")
        .hidden()
        .children(CHAPTER_BOX),
];

const WRITING_BOX: &[Mount] = &[
    Mount::new(mounts::WRITING_TITLE, "h1"),
    Mount::new(mounts::WRITING_META, "div").class("writing-meta"),
    Mount::new(mounts::WRITING_CONTENT, "div").class("writing-content"),
];

const WRITING: &[Mount] = &[
    Mount::new(mounts::WRITING_ERROR, "div")
        .class("glass-card error")
        .hidden(),
    Mount::new(mounts::WRITING_BOX, "article")
        .hidden()
        .children(WRITING_BOX),
];

fn route_mounts(route: Route) -> &'static [Mount] {
    match route {
        Route::Home => HOME,
        Route::Works => WORKS,
        Route::Writings => WRITINGS,
        Route::Novel => NOVEL,
        Route::Chapter => CHAPTER,
        Route::Writing => WRITING,
        Route::NotFound => &[],
    }
}

fn render_mount(out: &PageOutput, mount: &Mount, html: &mut String) {
    let visible = out.is_visible(mount.id).unwrap_or(!mount.hidden);
    let bound = out.attributes.get(mount.id);

    html.push('<');
    html.push_str(mount.tag);
    html.push_str(&format!(" id=\"{}\"", mount.id));
    if !mount.class.is_empty() {
        html.push_str(&format!(" class=\"{}\"", mount.class));
    }
    for (name, value) in mount.attrs {
        if bound.is_some_and(|attrs| attrs.contains_key(*name)) {
            continue;
        }
        html.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
    }
    if let Some(attrs) = bound {
        for (name, value) in attrs {
            html.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
    }
    if !visible {
        html.push_str(" hidden");
    }
    html.push('>');
    if mount.is_void() {
        return;
    }

    match out.html(mount.id) {
        Some(bound_html) => html.push_str(bound_html),
        None => {
            html.push_str(&escape_html(mount.label));
            for child in mount.children {
                render_mount(out, child, html);
            }
        }
    }
    html.push_str(&format!("</{}>", mount.tag));
}

/// Render a full HTML document for `route` with `out` bound into it.
///
/// A redirecting output renders as a refresh page pointing at its target.
pub fn render_document(route: Route, out: &PageOutput) -> String {
    let title = escape_html(out.document_title.as_deref().unwrap_or(DEFAULT_TITLE));
    let mut html = String::with_capacity(4096);
    html.push_str("<!doctype html>\n<html lang=\"id\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", title));

    if let Some(target) = &out.redirect {
        html.push_str(&format!(
            "<meta http-equiv=\"refresh\" content=\"0; url={}\">\n</head>\n<body></body>\n</html>\n",
            escape_html(target)
        ));
        return html;
    }

    if let Some(meta) = &out.meta_description {
        html.push_str(&format!(
            "<meta name=\"description\" content=\"{}\">\n",
            escape_html(meta)
        ));
    }
    if let Some(favicon) = &out.favicon {
        html.push_str(&format!(
            "<link rel=\"icon\" href=\"{}\">\n",
            escape_html(favicon)
        ));
    }
    html.push_str("<link rel=\"stylesheet\" href=\"assets/css/style.css\">\n</head>\n");
    html.push_str(&format!(
        "<body data-route=\"{}\">\n<header class=\"site-header\">",
        route.name()
    ));
    for mount in HEADER {
        render_mount(out, mount, &mut html);
    }
    html.push_str(concat!(
        "<nav class=\"site-nav\">",
        "<a href=\"index.html\">Beranda</a>",
        "<a href=\"works.html\">Karya</a>",
        "<a href=\"writings.html\">Tulisan</a>",
        "</nav></header>\n<main>"
    ));
    for mount in route_mounts(route) {
        render_mount(out, mount, &mut html);
    }
    html.push_str("</main>\n</body>\n</html>\n");
    html
}
