//! Site configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{ChapterStrategy, ProbeLimits};
use crate::source::ContentPaths;

/// Fallback cover used when a novel has none.
pub const DEFAULT_COVER: &str = "assets/images/defaults/cover-default.jpg";

/// Everything the resolver and page controllers need to know about a site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Where each content document lives.
    pub paths: ContentPaths,
    /// How chapter collections are stored.
    pub strategy: ChapterStrategy,
    /// Bounds for per-chapter probing.
    pub probe: ProbeLimits,
    /// Cover asset for novels without one.
    pub default_cover: String,
    /// Character budget for synopsis excerpts on work cards.
    pub truncate_synopsis: usize,
    /// Character budget for writing excerpts on writing cards.
    pub truncate_writing: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            paths: ContentPaths::default(),
            strategy: ChapterStrategy::default(),
            probe: ProbeLimits::default(),
            default_cover: DEFAULT_COVER.to_string(),
            truncate_synopsis: 170,
            truncate_writing: 200,
        }
    }
}

impl SiteConfig {
    /// Clamp values into usable ranges.
    pub fn normalized(mut self) -> Self {
        self.probe.max_probes = self.probe.max_probes.max(1);
        self.truncate_synopsis = self.truncate_synopsis.max(1);
        self.truncate_writing = self.truncate_writing.max(1);
        if self.default_cover.trim().is_empty() {
            self.default_cover = DEFAULT_COVER.to_string();
        }
        self.paths = self.paths.normalized();
        self
    }

    /// Parse a JSON config document; missing fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(raw).map(Self::normalized)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("read config {}: {}", path.display(), e))?;
        Self::from_json_str(&raw).map_err(|e| format!("parse config {}: {}", path.display(), e))
    }

    /// Cover reference for a novel, falling back to [`SiteConfig::default_cover`].
    pub fn cover_or_default<'a>(&'a self, cover: &'a str) -> &'a str {
        let trimmed = cover.trim();
        if trimmed.is_empty() {
            &self.default_cover
        } else {
            trimmed
        }
    }
}
