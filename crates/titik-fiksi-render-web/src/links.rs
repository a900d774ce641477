//! Outbound links to other pages of the site. Query values are always
//! percent-encoded.

use url::form_urlencoded::Serializer;
use url::{ParseError, Url};

fn page_with_query(page: &str, pairs: &[(&str, &str)]) -> String {
    let mut query = Serializer::new(String::new());
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
    format!("{}?{}", page, query.finish())
}

/// `novel.html?slug=<slug>`
pub fn novel_url(slug: &str) -> String {
    page_with_query("novel.html", &[("slug", slug)])
}

/// `chapter.html?novel=<slug>&chapter=<code>`
pub fn chapter_url(novel_slug: &str, code: &str) -> String {
    page_with_query("chapter.html", &[("novel", novel_slug), ("chapter", code)])
}

/// `writing.html?slug=<slug>`
pub fn writing_url(slug: &str) -> String {
    page_with_query("writing.html", &[("slug", slug)])
}

/// `raw` trimmed, when it is an `http(s)` URL or a relative link.
///
/// Links taken from content files go through this before they reach an
/// `href` or `src`, so `javascript:` and `data:` URLs are dropped.
pub fn safe_url(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(trimmed),
        Ok(url) => {
            log::warn!("dropping link with scheme '{}'", url.scheme());
            None
        }
        Err(ParseError::RelativeUrlWithoutBase) => Some(trimmed),
        Err(err) => {
            log::warn!("dropping unparsable link: {}", err);
            None
        }
    }
}
