use serde::Serialize;
use titik_fiksi::{ContentSource, SiteConfig};

use crate::context::PageContext;
use crate::output::PageOutput;
use crate::pages;

/// Pages the site knows how to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Home,
    Works,
    Writings,
    Novel,
    Chapter,
    Writing,
    NotFound,
}

/// Signature shared by all page controllers.
pub type Controller = fn(&PageContext, &dyn ContentSource, &SiteConfig) -> PageOutput;

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::Works,
        Route::Writings,
        Route::Novel,
        Route::Chapter,
        Route::Writing,
    ];

    /// Map the last path segment of a request to a route.
    pub fn from_page(page: &str) -> Self {
        match page.trim().to_ascii_lowercase().as_str() {
            "" | "index.html" => Route::Home,
            "works.html" => Route::Works,
            "writings.html" => Route::Writings,
            "novel.html" => Route::Novel,
            "chapter.html" => Route::Chapter,
            "writing.html" => Route::Writing,
            _ => Route::NotFound,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Works => "works",
            Route::Writings => "writings",
            Route::Novel => "novel",
            Route::Chapter => "chapter",
            Route::Writing => "writing",
            Route::NotFound => "not-found",
        }
    }

    /// File name the route is served under.
    pub fn page(self) -> Option<&'static str> {
        match self {
            Route::Home => Some("index.html"),
            Route::Works => Some("works.html"),
            Route::Writings => Some("writings.html"),
            Route::Novel => Some("novel.html"),
            Route::Chapter => Some("chapter.html"),
            Route::Writing => Some("writing.html"),
            Route::NotFound => None,
        }
    }

    pub fn controller(self) -> Option<Controller> {
        match self {
            Route::Home => Some(pages::home_page),
            Route::Works => Some(pages::works_page),
            Route::Writings => Some(pages::writings_page),
            Route::Novel => Some(pages::novel_page),
            Route::Chapter => Some(pages::chapter_page),
            Route::Writing => Some(pages::writing_page),
            Route::NotFound => None,
        }
    }
}

/// Run branding plus the route's controller.
///
/// Unknown routes produce a redirect to the homepage and touch no content.
pub fn render_page(
    ctx: &PageContext,
    source: &dyn ContentSource,
    config: &SiteConfig,
) -> PageOutput {
    let Some(controller) = ctx.route.controller() else {
        log::debug!("no controller for route {}", ctx.route.name());
        let mut out = PageOutput::new();
        out.redirect = Some("index.html".to_string());
        return out;
    };
    let mut out = pages::branding_page(ctx, source, config);
    out.merge(controller(ctx, source, config));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use titik_fiksi::MemorySource;

    #[test]
    fn pages_map_to_routes() {
        for route in Route::ALL {
            let page = route.page().unwrap_or_default();
            assert_eq!(Route::from_page(page), route);
        }
        assert_eq!(Route::from_page(""), Route::Home);
        assert_eq!(Route::from_page("Chapter.HTML"), Route::Chapter);
        assert_eq!(Route::from_page("about.html"), Route::NotFound);
    }

    #[test]
    fn unknown_route_redirects_without_fetching() {
        let source = MemorySource::new();
        let out = render_page(
            &PageContext::new(Route::NotFound),
            &source,
            &SiteConfig::default(),
        );
        assert_eq!(out.redirect.as_deref(), Some("index.html"));
        assert_eq!(source.fetch_count(), 0);
    }
}
