//! Error taxonomy shared by the resolver, navigator and page controllers.
//!
//! None of these are fatal: page controllers turn every variant into an
//! inline message or a redirect to a listing page.

use core::fmt;

/// Failure of a content lookup or page request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SiteError {
    /// A resource could not be fetched or parsed.
    ResourceUnavailable {
        /// Relative resource path that was requested.
        path: String,
    },
    /// A document loaded but holds no entries.
    CatalogEmpty {
        /// Which catalog was empty (`works`, `writings`, `chapters`).
        what: &'static str,
    },
    /// A slug or code did not match any entry of a loaded catalog.
    EntityNotFound {
        /// Entity kind (`novel`, `chapter`, `writing`).
        kind: &'static str,
        /// Requested key after normalization.
        key: String,
    },
    /// A required query parameter is missing from the page context.
    IncompleteRequest {
        /// Names of the missing parameters.
        params: Vec<&'static str>,
    },
}

impl SiteError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ResourceUnavailable { .. } => "resource_unavailable",
            Self::CatalogEmpty { .. } => "catalog_empty",
            Self::EntityNotFound { .. } => "entity_not_found",
            Self::IncompleteRequest { .. } => "incomplete_request",
        }
    }

    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::EntityNotFound {
            kind,
            key: key.into(),
        }
    }
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable { path } => {
                write!(f, "{}: resource unavailable [path={}]", self.code(), path)
            }
            Self::CatalogEmpty { what } => write!(f, "{}: {} catalog is empty", self.code(), what),
            Self::EntityNotFound { kind, key } => {
                write!(f, "{}: {} '{}' not found", self.code(), kind, key)
            }
            Self::IncompleteRequest { params } => {
                write!(
                    f,
                    "{}: missing parameter(s) {}",
                    self.code(),
                    params.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for SiteError {}
