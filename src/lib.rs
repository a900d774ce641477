//! Chapter discovery, navigation and text presentation for the Titik Fiksi
//! static fiction site.
//!
//! Content lives in static JSON documents. This crate fetches them through a
//! [`ContentSource`], resolves the published chapters of a novel into a
//! [`ChapterCatalog`], computes previous/next navigation targets and turns
//! raw chapter text into escaped, structured HTML.
//!
//! ```rust,no_run
//! use titik_fiksi::{adjacency, resolve_catalog, DirSource, SiteConfig};
//!
//! let config = SiteConfig::default();
//! let source = DirSource::new("public");
//! let catalog = resolve_catalog(&source, &config, "langit-senja");
//! if let Ok(nav) = adjacency(&catalog, "02") {
//!     println!("next: {:?}", nav.next.code());
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod navigator;
pub mod source;
pub mod text;

pub use catalog::{
    chapter_code, filter_chapters, probe_chapters, resolve_aggregate, resolve_catalog,
    resolve_probe, resolve_single, CatalogOrigin, ChapterCatalog, ChapterStrategy, ProbeLimits,
    ProbeReport, ProbeStop,
};
pub use config::SiteConfig;
pub use error::SiteError;
pub use model::{Chapter, HomeContent, Loaded, Novel, SiteSettings, Writing};
pub use navigator::{
    adjacency, adjacency_confirmed, locate, normalize_code, Adjacency, NavTarget,
};
pub use source::{
    load_home, load_settings, load_works, load_writings, ContentPaths, ContentSource, DirSource,
    MemorySource,
};
#[cfg(feature = "async")]
pub use source::{load_site_shell, AsyncDirSource, SiteShell};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use text::{
    blocks_to_html, escape_html, format_date, parse_blocks, render_body, safe_text, truncate,
    Block, Inline, EMPTY_BODY_PLACEHOLDER,
};
