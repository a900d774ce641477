//! Chapter catalog resolution.
//!
//! A novel's chapters are stored in one of two layouts:
//!
//! - an aggregate document `chapters/<slug>.json` holding a `chapters` list, or
//! - one document per chapter, `chapters/<slug>-<code>.json`, where `code` is
//!   the 1-based sequence number zero-padded to at least two digits.
//!
//! The content store cannot list a directory, so the per-chapter layout is
//! discovered by probing `01`, `02`, ... until a resource is missing. Probing
//! stops at the first gap: with chapters `01`, `02` and `04` only the first
//! two are found. Numbering must therefore be contiguous from `01`. Probing is
//! also capped by [`ProbeLimits::max_probes`] fetch attempts.
//!
//! Whatever the layout, the result is a [`ChapterCatalog`] of published
//! chapters in ascending code order.

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::model::{list_field, normalize_slug, Chapter};
use crate::navigator::normalize_code;
use crate::source::{ContentPaths, ContentSource};

/// Storage layout to resolve chapters from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStrategy {
    /// Only the aggregate document.
    Aggregate,
    /// Only per-chapter probing.
    Probe,
    /// Aggregate document when it carries a chapter list, probing otherwise.
    #[default]
    Auto,
}

/// Bounds for per-chapter probing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeLimits {
    /// Maximum fetch attempts for one novel.
    pub max_probes: usize,
}

impl Default for ProbeLimits {
    fn default() -> Self {
        Self { max_probes: 200 }
    }
}

/// How a catalog was built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Read from the aggregate document.
    Aggregate,
    /// Discovered by probing from `01`.
    Probe,
    /// A single per-chapter document; neighbors are unknown.
    Single,
}

/// Published chapters of one novel, ascending by code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterCatalog {
    novel_slug: String,
    origin: CatalogOrigin,
    chapters: Vec<Chapter>,
    discovered: usize,
}

impl ChapterCatalog {
    /// Build a catalog, sorting chapters by code.
    ///
    /// The caller is responsible for publish filtering.
    pub fn new(
        novel_slug: impl Into<String>,
        origin: CatalogOrigin,
        mut chapters: Vec<Chapter>,
    ) -> Self {
        chapters.sort_by(|a, b| a.code.cmp(&b.code));
        Self {
            novel_slug: novel_slug.into(),
            origin,
            discovered: chapters.len(),
            chapters,
        }
    }

    /// Record how many entries the source held before publish filtering.
    pub fn with_discovered(mut self, discovered: usize) -> Self {
        self.discovered = discovered.max(self.chapters.len());
        self
    }

    /// Empty catalog for `novel_slug`.
    pub fn empty(novel_slug: impl Into<String>, origin: CatalogOrigin) -> Self {
        Self::new(novel_slug, origin, Vec::new())
    }

    pub fn novel_slug(&self) -> &str {
        &self.novel_slug
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    /// Whether neighbors must be confirmed by fetching their resources.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self.origin, CatalogOrigin::Probe | CatalogOrigin::Single)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn first(&self) -> Option<&Chapter> {
        self.chapters.first()
    }

    /// Chapter at `index`.
    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Entries seen in the source, published or not.
    pub fn discovered(&self) -> usize {
        self.discovered
    }

    /// Whether the source held chapters but none are published.
    pub fn all_unpublished(&self) -> bool {
        self.chapters.is_empty() && self.discovered > 0
    }

    pub fn into_chapters(self) -> Vec<Chapter> {
        self.chapters
    }
}

/// Why probing stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeStop {
    /// The resource for this code was absent.
    Missing(String),
    /// The attempt ceiling was reached.
    Ceiling,
}

/// Result of probing one novel's per-chapter resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeReport {
    /// Published chapters found, tagged with their probed codes.
    pub chapters: Vec<Chapter>,
    /// Fetch attempts issued.
    pub attempts: usize,
    /// Resources found, including unpublished ones.
    pub found: usize,
    pub stop: ProbeStop,
}

/// Zero-padded code for a 1-based sequence number (`1` → `01`, `100` → `100`).
pub fn chapter_code(sequence: usize) -> String {
    format!("{:02}", sequence)
}

/// Chapter list of the aggregate document, or `None` when the document or its
/// `chapters` list is missing. All entries are returned, published or not.
fn read_aggregate<S: ContentSource + ?Sized>(
    source: &S,
    paths: &ContentPaths,
    novel_slug: &str,
) -> Option<Vec<Chapter>> {
    let path = paths.aggregate_chapters(novel_slug);
    let doc = source.fetch_json(&path)?;
    let chapters = list_field::<Chapter>(&doc, "chapters");
    if chapters.is_none() {
        log::warn!("{} has no 'chapters' list", path);
    }
    chapters
}

fn aggregate_catalog(novel_slug: &str, chapters: Vec<Chapter>) -> ChapterCatalog {
    let discovered = chapters.len();
    let published = chapters
        .into_iter()
        .filter(Chapter::is_published_strict)
        .collect();
    ChapterCatalog::new(novel_slug, CatalogOrigin::Aggregate, published)
        .with_discovered(discovered)
}

/// Resolve chapters from the aggregate document.
///
/// A missing document or list yields an empty catalog. Only chapters with
/// `published: true` are kept.
pub fn resolve_aggregate<S: ContentSource + ?Sized>(
    source: &S,
    paths: &ContentPaths,
    novel_slug: &str,
) -> ChapterCatalog {
    let slug = normalize_slug(novel_slug);
    if slug.is_empty() {
        return ChapterCatalog::empty(slug, CatalogOrigin::Aggregate);
    }
    let chapters = read_aggregate(source, paths, &slug).unwrap_or_default();
    aggregate_catalog(&slug, chapters)
}

/// Probe `<slug>-01`, `<slug>-02`, ... until a resource is missing or
/// `limits.max_probes` attempts have been made.
///
/// Found chapters take the probed code, replacing any `code` field in the
/// document. Chapters with `published: false` are skipped but do not stop
/// probing. A document that is not a chapter object ends the run like a
/// missing one.
pub fn probe_chapters<S: ContentSource + ?Sized>(
    source: &S,
    paths: &ContentPaths,
    novel_slug: &str,
    limits: ProbeLimits,
) -> ProbeReport {
    let mut report = ProbeReport {
        chapters: Vec::new(),
        attempts: 0,
        found: 0,
        stop: ProbeStop::Ceiling,
    };

    for sequence in 1..=limits.max_probes {
        let code = chapter_code(sequence);
        let path = paths.chapter_resource(novel_slug, &code);
        report.attempts += 1;

        let Some(mut chapter) = source
            .fetch_json(&path)
            .and_then(|doc| fetched_chapter(&path, doc))
        else {
            log::debug!("probe for {} stopped at {}", novel_slug, code);
            report.stop = ProbeStop::Missing(code);
            return finish_probe(report);
        };

        report.found += 1;
        chapter.code = code;
        if chapter.is_published_lenient() {
            report.chapters.push(chapter);
        } else {
            log::debug!("skipping unpublished chapter {}", path);
        }
    }

    log::warn!(
        "probe for {} reached the ceiling of {} attempts",
        novel_slug,
        limits.max_probes
    );
    finish_probe(report)
}

fn finish_probe(mut report: ProbeReport) -> ProbeReport {
    report.chapters.sort_by(|a, b| a.code.cmp(&b.code));
    report
}

fn fetched_chapter(path: &str, doc: serde_json::Value) -> Option<Chapter> {
    if !doc.is_object() {
        log::warn!("{} is not a chapter object", path);
        return None;
    }
    match serde_json::from_value::<Chapter>(doc) {
        Ok(chapter) => Some(chapter),
        Err(err) => {
            log::warn!("malformed chapter {}: {}", path, err);
            None
        }
    }
}

/// Resolve chapters by probing per-chapter resources.
pub fn resolve_probe<S: ContentSource + ?Sized>(
    source: &S,
    paths: &ContentPaths,
    novel_slug: &str,
    limits: ProbeLimits,
) -> ChapterCatalog {
    let slug = normalize_slug(novel_slug);
    if slug.is_empty() {
        return ChapterCatalog::empty(slug, CatalogOrigin::Probe);
    }
    let report = probe_chapters(source, paths, &slug, limits);
    ChapterCatalog::new(slug, CatalogOrigin::Probe, report.chapters)
        .with_discovered(report.found)
}

/// Resolve a novel's chapters with the configured strategy.
///
/// Under [`ChapterStrategy::Auto`] an aggregate document carrying a
/// `chapters` list wins, even when per-chapter resources also exist.
pub fn resolve_catalog<S: ContentSource + ?Sized>(
    source: &S,
    config: &SiteConfig,
    novel_slug: &str,
) -> ChapterCatalog {
    let paths = &config.paths;
    match config.strategy {
        ChapterStrategy::Aggregate => resolve_aggregate(source, paths, novel_slug),
        ChapterStrategy::Probe => resolve_probe(source, paths, novel_slug, config.probe),
        ChapterStrategy::Auto => {
            let slug = normalize_slug(novel_slug);
            if slug.is_empty() {
                return ChapterCatalog::empty(slug, CatalogOrigin::Aggregate);
            }
            match read_aggregate(source, paths, &slug) {
                Some(chapters) => aggregate_catalog(&slug, chapters),
                None => {
                    log::debug!("no aggregate chapters for {}, probing", slug);
                    resolve_probe(source, paths, &slug, config.probe)
                }
            }
        }
    }
}

/// Pad a purely numeric code the way chapter files are named (`2` -> `02`).
fn numbered_code(code: &str) -> String {
    match code.parse::<usize>() {
        Ok(sequence) if code.bytes().all(|b| b.is_ascii_digit()) => chapter_code(sequence),
        _ => code.to_string(),
    }
}

/// Load one per-chapter document without probing the rest of the novel.
///
/// The returned catalog holds just that chapter and is marked
/// [`CatalogOrigin::Single`], so navigation confirms neighbors by fetching.
pub fn resolve_single<S: ContentSource + ?Sized>(
    source: &S,
    paths: &ContentPaths,
    novel_slug: &str,
    code: &str,
) -> Result<ChapterCatalog, SiteError> {
    let slug = normalize_slug(novel_slug);
    let code = numbered_code(&normalize_code(code));
    let mut missing = Vec::new();
    if slug.is_empty() {
        missing.push("novel");
    }
    if code.is_empty() {
        missing.push("chapter");
    }
    if !missing.is_empty() {
        return Err(SiteError::IncompleteRequest { params: missing });
    }

    let path = paths.chapter_resource(&slug, &code);
    let mut chapter = source
        .fetch_json(&path)
        .and_then(|doc| fetched_chapter(&path, doc))
        .filter(Chapter::is_published_lenient)
        .ok_or_else(|| SiteError::not_found("chapter", code.clone()))?;
    chapter.code = code;
    Ok(ChapterCatalog::new(slug, CatalogOrigin::Single, vec![chapter]))
}

/// Chapters whose code or title contains `query`, ignoring case.
///
/// A blank query matches everything.
pub fn filter_chapters<'a>(chapters: &'a [Chapter], query: &str) -> Vec<&'a Chapter> {
    let needle = query.trim().to_lowercase();
    chapters
        .iter()
        .filter(|ch| {
            needle.is_empty()
                || ch.code.to_lowercase().contains(&needle)
                || ch.title.to_lowercase().contains(&needle)
        })
        .collect()
}
