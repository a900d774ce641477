use std::collections::BTreeMap;

use url::Url;

use crate::router::Route;

/// The page being rendered: route and query parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageContext {
    pub route: Route,
    query: BTreeMap<String, String>,
}

impl PageContext {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            query: BTreeMap::new(),
        }
    }

    /// Builder for a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Parse an absolute URL or a site-relative target such as
    /// `/chapter.html?novel=senja&chapter=02`.
    ///
    /// Unparsable input maps to [`Route::NotFound`]. For repeated keys the
    /// first value wins.
    pub fn from_target(target: &str) -> Self {
        let parsed = Url::parse("http://localhost/").and_then(|base| base.join(target.trim()));
        let Ok(url) = parsed else {
            log::debug!("unparsable page target {:?}", target);
            return Self::new(Route::NotFound);
        };

        let page = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();
        let mut ctx = Self::new(Route::from_page(page));
        for (key, value) in url.query_pairs() {
            ctx.query
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        ctx
    }

    /// Trimmed, non-empty query value.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
