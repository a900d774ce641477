//! Page controllers and HTML projection for `titik-fiksi`.
//!
//! A request is described by a [`PageContext`] (route plus query
//! parameters). [`render_page`] runs branding and the route's controller
//! against a content source and returns a [`PageOutput`]: the HTML, text,
//! attribute and visibility bindings for the page's mount points.
//! [`render_document`] binds an output into the built-in page shell.

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

mod context;
mod links;
mod output;
mod pages;
mod router;
mod shell;

pub use context::PageContext;
pub use links::{chapter_url, novel_url, writing_url};
pub use output::{mounts, PageOutput};
pub use pages::{
    branding_page, chapter_page, home_page, novel_page, work_card, works_page, writing_card,
    writing_page, writings_page,
};
pub use router::{render_page, Controller, Route};
pub use shell::render_document;
