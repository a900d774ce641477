//! Page controllers.
//!
//! Each controller reads what its page needs from the content source and
//! returns bindings; failures become inline messages, never panics.

use titik_fiksi::model::normalize_slug;
use titik_fiksi::{
    adjacency_confirmed, escape_html, filter_chapters, format_date, load_home, load_settings,
    load_works, load_writings, locate, render_body, resolve_catalog, safe_text, truncate,
    ChapterCatalog, ContentSource, Loaded, NavTarget, Novel, SiteConfig, SiteError, Writing,
};

use crate::context::PageContext;
use crate::links::{chapter_url, novel_url, safe_url, writing_url};
use crate::output::{mounts, PageOutput};

const SITE_NAME: &str = "Titik Fiksi";

fn notice(message: &str) -> String {
    format!(
        "<div class=\"glass-card notice\">{}</div>",
        escape_html(message)
    )
}

/// Logo, favicon, meta description and document title from the settings
/// document. Runs for every route; a missing document changes nothing.
pub fn branding_page(
    _ctx: &PageContext,
    source: &dyn ContentSource,
    config: &SiteConfig,
) -> PageOutput {
    let mut out = PageOutput::new();
    let Some(settings) = load_settings(source, &config.paths) else {
        return out;
    };

    let meta = settings.meta_description.trim();
    if !meta.is_empty() {
        out.meta_description = Some(meta.to_string());
    }
    let title = settings.site_title.trim();
    if !title.is_empty() {
        out.document_title = Some(title.to_string());
    }
    if let Some(logo) = safe_url(&settings.brand_logo) {
        out.set_attr(mounts::BRAND_LOGO, "src", logo);
        out.show(mounts::BRAND_LOGO);
    }
    if let Some(favicon) = safe_url(&settings.brand_favicon) {
        out.favicon = Some(favicon.to_string());
    }
    out
}

/// Homepage hero, video frame and social links.
pub fn home_page(_ctx: &PageContext, source: &dyn ContentSource, config: &SiteConfig) -> PageOutput {
    let mut out = PageOutput::new();
    let Some(home) = load_home(source, &config.paths) else {
        return out;
    };

    out.set_text(mounts::HERO_TITLE, &safe_text(&home.hero.title, SITE_NAME));
    out.set_text(
        mounts::HERO_SUBTITLE,
        &safe_text(&home.hero.subtitle, "Novelis • Penulis"),
    );
    out.set_text(mounts::INTRO_TEXT, home.hero.intro.trim());

    match safe_url(&home.hero.youtube_embed) {
        Some(embed) => {
            out.set_attr(mounts::YOUTUBE_FRAME, "src", embed);
            out.show(mounts::YOUTUBE_FRAME);
        }
        None => out.hide(mounts::YOUTUBE_FRAME),
    }

    let links: String = home
        .social
        .iter()
        .filter_map(|(name, url)| safe_url(url).map(|url| (name, url)))
        .map(|(name, url)| {
            format!(
                "<a class=\"social-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
                escape_html(url),
                escape_html(name)
            )
        })
        .collect();
    if links.is_empty() {
        out.hide(mounts::SOCIAL_LINKS);
    } else {
        out.set_html(mounts::SOCIAL_LINKS, links);
        out.show(mounts::SOCIAL_LINKS);
    }
    out
}

/// Card markup for one novel.
pub fn work_card(work: &Novel, config: &SiteConfig) -> String {
    let title = safe_text(&work.title, "Judul belum diisi");
    let genre = safe_text(&work.genre, "Genre belum diisi");
    let status = safe_text(&work.status, "Ongoing");
    let synopsis = safe_text(&work.synopsis, "Sinopsis belum ditulis.");
    let cover = safe_url(config.cover_or_default(&work.cover)).unwrap_or(&config.default_cover);
    let slug = work.normalized_slug();

    let action = if slug.is_empty() {
        String::new()
    } else {
        format!(
            "<a class=\"btn btn-primary\" href=\"{}\">📖 Detail</a>",
            escape_html(&novel_url(&slug))
        )
    };

    format!(
        concat!(
            "<article class=\"glass-card work-card\">",
            "<div class=\"work-cover\"><img src=\"{cover}\" alt=\"{title}\" loading=\"lazy\"></div>",
            "<div class=\"work-meta\"><span class=\"badge\">📌 {genre}</span>",
            "<span class=\"badge\">✅ {status}</span></div>",
            "<h3 class=\"work-title\">{title}</h3>",
            "<p class=\"work-desc\">{synopsis}</p>",
            "<div class=\"work-actions\">{action}</div>",
            "</article>"
        ),
        cover = escape_html(cover),
        title = escape_html(&title),
        genre = escape_html(&genre),
        status = escape_html(&status),
        synopsis = escape_html(&truncate(&synopsis, config.truncate_synopsis)),
        action = action,
    )
}

/// Works listing with explicit unavailable and empty states.
pub fn works_page(_ctx: &PageContext, source: &dyn ContentSource, config: &SiteConfig) -> PageOutput {
    let mut out = PageOutput::new();
    let html = match load_works(source, &config.paths) {
        Loaded::Unavailable => notice("Gagal memuat karya."),
        Loaded::Empty => notice("Belum ada novel."),
        Loaded::Items(works) => works.iter().map(|w| work_card(w, config)).collect(),
    };
    out.set_html(mounts::WORKS_CONTAINER, html);
    out
}

/// Card markup for one writing.
pub fn writing_card(writing: &Writing, config: &SiteConfig) -> String {
    let title = safe_text(&writing.title, "Judul belum diisi");
    let category = safe_text(&writing.category, "Umum");
    let date = format_date(&writing.date);
    let mut excerpt = truncate(&writing.content, config.truncate_writing);
    if excerpt.is_empty() {
        excerpt = "Belum ada isi tulisan.".to_string();
    }
    let slug = writing.normalized_slug();

    let meta = if date.is_empty() {
        format!("🗂️ {}", escape_html(&category))
    } else {
        format!("🗂️ {} • 📅 {}", escape_html(&category), escape_html(&date))
    };
    let action = if slug.is_empty() {
        String::new()
    } else {
        format!(
            "<a class=\"btn btn-primary\" href=\"{}\">📄 Baca</a>",
            escape_html(&writing_url(&slug))
        )
    };

    format!(
        concat!(
            "<article class=\"glass-card writing-card\">",
            "<h3 class=\"writing-title\">{title}</h3>",
            "<div class=\"writing-meta\">{meta}</div>",
            "<div class=\"writing-body\">{excerpt}</div>",
            "<div class=\"work-actions\">{action}</div>",
            "</article>"
        ),
        title = escape_html(&title),
        meta = meta,
        excerpt = escape_html(&excerpt),
        action = action,
    )
}

/// Writings listing with explicit unavailable and empty states.
pub fn writings_page(
    _ctx: &PageContext,
    source: &dyn ContentSource,
    config: &SiteConfig,
) -> PageOutput {
    let mut out = PageOutput::new();
    let html = match load_writings(source, &config.paths) {
        Loaded::Unavailable => notice("Gagal memuat tulisan."),
        Loaded::Empty => notice("Belum ada tulisan."),
        Loaded::Items(writings) => writings.iter().map(|w| writing_card(w, config)).collect(),
    };
    out.set_html(mounts::WRITINGS_CONTAINER, html);
    out
}

fn find_novel(works: &[Novel], slug: &str) -> Result<Novel, SiteError> {
    works
        .iter()
        .find(|w| w.normalized_slug() == slug)
        .cloned()
        .ok_or_else(|| SiteError::EntityNotFound {
            kind: "novel",
            key: slug.to_string(),
        })
}

/// Novel detail: metadata, "read first" link and the searchable chapter list.
///
/// Reads `slug` and the optional chapter filter `q` from the context.
pub fn novel_page(ctx: &PageContext, source: &dyn ContentSource, config: &SiteConfig) -> PageOutput {
    let mut out = PageOutput::new();
    let Some(slug) = ctx.param("slug").map(normalize_slug) else {
        out.fail(
            mounts::NOVEL_ERROR,
            "❌ Novel tidak ditemukan. Link tidak memiliki <b>slug</b>.",
        );
        return out;
    };

    let works = load_works(source, &config.paths);
    if works.is_unavailable() {
        out.fail(mounts::NOVEL_ERROR, "❌ Gagal memuat data novel.");
        return out;
    }
    let novel = match find_novel(works.items(), &slug) {
        Ok(novel) => novel,
        Err(err) => {
            log::debug!("novel page: {}", err);
            out.fail(
                mounts::NOVEL_ERROR,
                format!(
                    "❌ Novel dengan slug <b>{}</b> tidak ditemukan.",
                    escape_html(&slug)
                ),
            );
            return out;
        }
    };

    let title = safe_text(&novel.title, "Judul belum diisi");
    out.document_title = Some(format!("{} • {}", title, SITE_NAME));
    out.set_text(mounts::NOVEL_TITLE, &title);
    out.set_text(
        mounts::NOVEL_GENRE,
        &format!("📌 {}", safe_text(&novel.genre, "Genre")),
    );
    out.set_text(
        mounts::NOVEL_STATUS,
        &format!("✅ {}", safe_text(&novel.status, "Ongoing")),
    );
    out.set_text(
        mounts::NOVEL_SYNOPSIS,
        &safe_text(&novel.synopsis, "Sinopsis belum ditulis."),
    );
    let cover = safe_url(config.cover_or_default(&novel.cover)).unwrap_or(&config.default_cover);
    out.set_attr(mounts::NOVEL_COVER, "src", cover);
    out.set_attr(mounts::NOVEL_COVER, "alt", title);
    out.show(mounts::NOVEL_DETAIL);

    let catalog = resolve_catalog(source, config, &slug);
    if catalog.is_empty() {
        let message = if catalog.all_unpublished() {
            "Bab belum dipublikasikan."
        } else {
            "Belum ada bab untuk novel ini."
        };
        out.set_html(mounts::CHAPTERS_LIST, notice(message));
        out.hide(mounts::BTN_READ_FIRST);
        return out;
    }

    if let Some(first) = catalog.first() {
        out.set_attr(mounts::BTN_READ_FIRST, "href", chapter_url(&slug, &first.code));
        out.show(mounts::BTN_READ_FIRST);
    }

    let query = ctx.param("q").unwrap_or_default();
    out.set_attr(mounts::CHAPTER_SEARCH, "value", query);
    out.set_attr(mounts::SEARCH_SLUG, "value", slug.as_str());
    out.set_html(mounts::CHAPTERS_LIST, chapter_list(&catalog, query));
    out
}

fn chapter_list(catalog: &ChapterCatalog, query: &str) -> String {
    let filtered = filter_chapters(catalog.chapters(), query);
    if filtered.is_empty() {
        return notice("Tidak ada bab yang cocok.");
    }
    filtered
        .into_iter()
        .map(|ch| {
            let code = safe_text(&ch.code, "--");
            let title = safe_text(&ch.title, "Judul bab belum diisi");
            let date = format_date(&ch.date);
            let label = if date.is_empty() {
                format!("Bab {}", code)
            } else {
                format!("Bab {} • {}", code, date)
            };
            format!(
                concat!(
                    "<div class=\"glass-card chapter-item\">",
                    "<div><div class=\"chapter-label\">{label}</div>",
                    "<div class=\"chapter-name\">{title}</div></div>",
                    "<a class=\"btn btn-primary\" href=\"{url}\">Baca</a>",
                    "</div>"
                ),
                label = escape_html(&label),
                title = escape_html(&title),
                url = escape_html(&chapter_url(catalog.novel_slug(), &code)),
            )
        })
        .collect()
}

fn bind_nav(out: &mut PageOutput, id: &str, target: &NavTarget) {
    match target {
        NavTarget::Chapter { novel_slug, code } => {
            out.set_attr(id, "href", chapter_url(novel_slug, code));
            out.show(id);
        }
        NavTarget::Boundary => out.hide(id),
    }
}

/// Chapter reader: title, body, back link, previous/next controls and
/// external reading links.
///
/// Reads `novel` and `chapter` from the context.
pub fn chapter_page(
    ctx: &PageContext,
    source: &dyn ContentSource,
    config: &SiteConfig,
) -> PageOutput {
    let mut out = PageOutput::new();
    let (Some(slug), Some(code)) = (
        ctx.param("novel").map(normalize_slug),
        ctx.param("chapter"),
    ) else {
        out.fail(
            mounts::CHAPTER_ERROR,
            "❌ Link bab tidak lengkap. Pastikan ada <b>novel</b> dan <b>chapter</b>.",
        );
        return out;
    };

    let catalog = resolve_catalog(source, config, &slug);
    if catalog.is_empty() {
        out.fail(mounts::CHAPTER_ERROR, "❌ Data bab untuk novel ini belum ada.");
        out.set_attr(mounts::BTN_BACK_NOVEL, "href", novel_url(&slug));
        return out;
    }

    let located = locate(&catalog, code).and_then(|(_, chapter)| {
        adjacency_confirmed(source, config, &catalog, code).map(|nav| (chapter, nav))
    });
    let (chapter, nav) = match located {
        Ok(found) => found,
        Err(err) => {
            log::debug!("chapter page: {}", err);
            out.fail(
                mounts::CHAPTER_ERROR,
                format!(
                    "❌ Bab <b>{}</b> tidak ditemukan atau belum dipublikasikan.",
                    escape_html(code)
                ),
            );
            out.set_attr(mounts::BTN_BACK_NOVEL, "href", novel_url(&slug));
            return out;
        }
    };

    let title = safe_text(&chapter.title, &format!("Bab {}", chapter.code));
    out.document_title = Some(format!("{} • {}", title, SITE_NAME));
    out.set_text(
        mounts::CHAPTER_TOP,
        &format!("Novel: {} • Bab {}", slug, chapter.code),
    );
    out.set_text(mounts::CHAPTER_TITLE, &title);
    out.set_html(
        mounts::CHAPTER_CONTENT,
        render_body(Some(chapter.content.as_str())),
    );
    out.set_attr(mounts::BTN_BACK_NOVEL, "href", novel_url(&slug));
    bind_nav(&mut out, mounts::BTN_PREV, &nav.prev);
    bind_nav(&mut out, mounts::BTN_NEXT, &nav.next);

    let links: String = chapter
        .links
        .iter()
        .filter_map(|(platform, url)| safe_url(url).map(|url| (platform, url)))
        .map(|(platform, url)| {
            format!(
                "<a class=\"btn btn-ghost\" href=\"{}\" target=\"_blank\" rel=\"noopener\">Baca di {}</a>",
                escape_html(url),
                escape_html(platform)
            )
        })
        .collect();
    if links.is_empty() {
        out.hide(mounts::CHAPTER_LINKS);
    } else {
        out.set_html(mounts::CHAPTER_LINKS, links);
        out.show(mounts::CHAPTER_LINKS);
    }

    out.show(mounts::CHAPTER_BOX);
    out
}

/// A single writing rendered through the text presenter. Reads `slug`.
pub fn writing_page(
    ctx: &PageContext,
    source: &dyn ContentSource,
    config: &SiteConfig,
) -> PageOutput {
    let mut out = PageOutput::new();
    let Some(slug) = ctx.param("slug").map(normalize_slug) else {
        out.fail(
            mounts::WRITING_ERROR,
            "❌ Tulisan tidak ditemukan. Link tidak memiliki <b>slug</b>.",
        );
        return out;
    };

    let writings = load_writings(source, &config.paths);
    if writings.is_unavailable() {
        out.fail(mounts::WRITING_ERROR, "❌ Gagal memuat tulisan.");
        return out;
    }
    let Some(writing) = writings
        .items()
        .iter()
        .find(|w| w.normalized_slug() == slug)
    else {
        out.fail(
            mounts::WRITING_ERROR,
            format!(
                "❌ Tulisan dengan slug <b>{}</b> tidak ditemukan.",
                escape_html(&slug)
            ),
        );
        return out;
    };

    let title = safe_text(&writing.title, "Judul belum diisi");
    let category = safe_text(&writing.category, "Umum");
    let date = format_date(&writing.date);
    out.document_title = Some(format!("{} • {}", title, SITE_NAME));
    out.set_text(mounts::WRITING_TITLE, &title);
    if date.is_empty() {
        out.set_text(mounts::WRITING_META, &format!("🗂️ {}", category));
    } else {
        out.set_text(mounts::WRITING_META, &format!("🗂️ {} • 📅 {}", category, date));
    }
    let body = if writing.content.trim().is_empty() {
        notice("Belum ada isi tulisan.")
    } else {
        render_body(Some(writing.content.as_str()))
    };
    out.set_html(mounts::WRITING_CONTENT, body);
    out.show(mounts::WRITING_BOX);
    out
}
