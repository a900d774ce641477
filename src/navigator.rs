//! Chapter lookup and previous/next navigation.
//!
//! Codes are compared after [`normalize_code`] on both sides. Adjacency comes
//! from a chapter's position in the sorted catalog; the first chapter has no
//! previous and the last has no next. A side without a chapter is reported as
//! [`NavTarget::Boundary`] so callers can disable the control instead of
//! building a dead link.

use crate::catalog::{chapter_code, CatalogOrigin, ChapterCatalog};
use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::model::Chapter;
use crate::source::ContentSource;

/// Canonical form of a chapter code: trimmed, lowercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// One side of a chapter's navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavTarget {
    /// A navigable chapter.
    Chapter { novel_slug: String, code: String },
    /// No chapter on this side.
    Boundary,
}

impl NavTarget {
    fn chapter(novel_slug: &str, code: &str) -> Self {
        Self::Chapter {
            novel_slug: novel_slug.to_string(),
            code: code.to_string(),
        }
    }

    /// Target code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Chapter { code, .. } => Some(code),
            Self::Boundary => None,
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary)
    }
}

/// Previous and next targets of the chapter at `index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adjacency {
    pub index: usize,
    pub prev: NavTarget,
    pub next: NavTarget,
}

/// Find the chapter whose code matches `code`.
pub fn locate<'a>(
    catalog: &'a ChapterCatalog,
    code: &str,
) -> Result<(usize, &'a Chapter), SiteError> {
    let wanted = normalize_code(code);
    if wanted.is_empty() {
        return Err(SiteError::IncompleteRequest {
            params: vec!["chapter"],
        });
    }
    catalog
        .chapters()
        .iter()
        .enumerate()
        .find(|(_, ch)| normalize_code(&ch.code) == wanted)
        .ok_or_else(|| SiteError::not_found("chapter", wanted))
}

/// In-memory adjacency; performs no I/O.
pub fn adjacency(catalog: &ChapterCatalog, code: &str) -> Result<Adjacency, SiteError> {
    let (index, _) = locate(catalog, code)?;
    let slug = catalog.novel_slug();
    let prev = index
        .checked_sub(1)
        .and_then(|i| catalog.get(i))
        .map_or(NavTarget::Boundary, |ch| NavTarget::chapter(slug, &ch.code));
    let next = catalog
        .get(index + 1)
        .map_or(NavTarget::Boundary, |ch| NavTarget::chapter(slug, &ch.code));
    Ok(Adjacency { index, prev, next })
}

/// Adjacency with neighbor resources confirmed where the catalog cannot vouch
/// for them.
///
/// - Aggregate catalogs: same as [`adjacency`].
/// - Probed catalogs: the next chapter's resource is fetched again and must
///   still exist and not be unpublished.
/// - Single-chapter catalogs: neighbors are found by fetching the adjacent
///   numbered resources, skipping unpublished ones, stopping at the first
///   missing resource and after `config.probe.max_probes` attempts per side.
pub fn adjacency_confirmed<S: ContentSource + ?Sized>(
    source: &S,
    config: &SiteConfig,
    catalog: &ChapterCatalog,
    code: &str,
) -> Result<Adjacency, SiteError> {
    let mut adj = adjacency(catalog, code)?;
    let slug = catalog.novel_slug();

    match catalog.origin() {
        CatalogOrigin::Aggregate => {}
        CatalogOrigin::Probe => {
            if let Some(next_code) = adj.next.code() {
                if resource_state(source, config, slug, next_code) != ResourceState::Published {
                    log::debug!("next chapter {} of {} no longer available", next_code, slug);
                    adj.next = NavTarget::Boundary;
                }
            }
        }
        CatalogOrigin::Single => {
            let current = catalog
                .get(adj.index)
                .and_then(|ch| ch.code.trim().parse::<usize>().ok());
            if let Some(number) = current {
                adj.prev = scan(source, config, slug, number, Direction::Backward);
                adj.next = scan(source, config, slug, number, Direction::Forward);
            }
        }
    }
    Ok(adj)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ResourceState {
    Missing,
    Unpublished,
    Published,
}

fn resource_state<S: ContentSource + ?Sized>(
    source: &S,
    config: &SiteConfig,
    slug: &str,
    code: &str,
) -> ResourceState {
    let path = config.paths.chapter_resource(slug, code);
    match source.fetch_json(&path) {
        Some(doc) if doc.is_object() => {
            if doc.get("published").and_then(|v| v.as_bool()) == Some(false) {
                ResourceState::Unpublished
            } else {
                ResourceState::Published
            }
        }
        _ => ResourceState::Missing,
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Backward,
    Forward,
}

fn scan<S: ContentSource + ?Sized>(
    source: &S,
    config: &SiteConfig,
    slug: &str,
    from: usize,
    direction: Direction,
) -> NavTarget {
    let mut number = from;
    for _ in 0..config.probe.max_probes {
        number = match direction {
            Direction::Backward if number > 1 => number - 1,
            Direction::Backward => return NavTarget::Boundary,
            Direction::Forward => number + 1,
        };
        let code = chapter_code(number);
        match resource_state(source, config, slug, &code) {
            ResourceState::Published => return NavTarget::chapter(slug, &code),
            ResourceState::Unpublished => continue,
            ResourceState::Missing => return NavTarget::Boundary,
        }
    }
    NavTarget::Boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{resolve_probe, resolve_single, ProbeLimits};
    use crate::source::{ContentPaths, MemorySource};
    use serde_json::json;

    fn chapter(code: &str) -> Chapter {
        Chapter {
            code: code.to_string(),
            title: format!("Bab {}", code),
            published: Some(true),
            ..Chapter::default()
        }
    }

    fn abc() -> ChapterCatalog {
        ChapterCatalog::new(
            "senja",
            CatalogOrigin::Aggregate,
            vec![chapter("C"), chapter("A"), chapter("B")],
        )
    }

    fn target(code: &str) -> NavTarget {
        NavTarget::chapter("senja", code)
    }

    #[test]
    fn three_chapter_adjacency() {
        let catalog = abc();
        let a = adjacency(&catalog, "A").unwrap();
        assert_eq!((a.prev, a.next), (NavTarget::Boundary, target("B")));
        let b = adjacency(&catalog, "B").unwrap();
        assert_eq!((b.prev, b.next), (target("A"), target("C")));
        let c = adjacency(&catalog, "C").unwrap();
        assert_eq!((c.prev, c.next), (target("B"), NavTarget::Boundary));
    }

    #[test]
    fn lookup_normalizes_both_sides() {
        let catalog = ChapterCatalog::new(
            "senja",
            CatalogOrigin::Aggregate,
            vec![chapter(" Prolog "), chapter("01")],
        );
        let (index, found) = locate(&catalog, "prolog").unwrap();
        assert_eq!(index, 0);
        assert_eq!(found.title, "Bab  Prolog ");
        assert_eq!(locate(&catalog, " 01\n").unwrap().0, 1);
    }

    #[test]
    fn unknown_code_is_not_found() {
        let catalog = abc();
        assert_eq!(
            adjacency(&catalog, "Z"),
            Err(SiteError::not_found("chapter", "z"))
        );
        assert_eq!(
            locate(&catalog, "  ").map(|(i, _)| i),
            Err(SiteError::IncompleteRequest {
                params: vec!["chapter"]
            })
        );
        let empty = ChapterCatalog::empty("senja", CatalogOrigin::Aggregate);
        assert!(adjacency(&empty, "01").is_err());
    }

    #[test]
    fn single_chapter_catalog_has_no_neighbors_in_memory() {
        let catalog = ChapterCatalog::new("senja", CatalogOrigin::Aggregate, vec![chapter("01")]);
        let adj = adjacency(&catalog, "01").unwrap();
        assert!(adj.prev.is_boundary());
        assert!(adj.next.is_boundary());
    }

    #[test]
    fn aggregate_confirmation_does_no_io() {
        let source = MemorySource::new();
        let adj = adjacency_confirmed(&source, &SiteConfig::default(), &abc(), "B").unwrap();
        assert_eq!(adj.next, target("C"));
        assert_eq!(source.fetch_count(), 0);
    }

    #[test]
    fn probed_next_is_confirmed_by_fetch() {
        let paths = ContentPaths::default();
        let mut source = MemorySource::new()
            .with_json(paths.chapter_resource("senja", "01"), json!({ "title": "A" }))
            .with_json(paths.chapter_resource("senja", "02"), json!({ "title": "B" }));
        let catalog = resolve_probe(&source, &paths, "senja", ProbeLimits::default());
        assert_eq!(catalog.len(), 2);

        source.reset_log();
        let adj = adjacency_confirmed(&source, &SiteConfig::default(), &catalog, "01").unwrap();
        assert_eq!(adj.next, target("02"));
        assert_eq!(
            source.fetched_paths(),
            vec![paths.chapter_resource("senja", "02")]
        );

        source.remove(&paths.chapter_resource("senja", "02"));
        let adj = adjacency_confirmed(&source, &SiteConfig::default(), &catalog, "01").unwrap();
        assert!(adj.next.is_boundary());
    }

    #[test]
    fn single_context_scans_neighbors() {
        let paths = ContentPaths::default();
        let source = MemorySource::new()
            .with_json(paths.chapter_resource("senja", "01"), json!({ "title": "A" }))
            .with_json(
                paths.chapter_resource("senja", "02"),
                json!({ "title": "B", "published": false }),
            )
            .with_json(paths.chapter_resource("senja", "03"), json!({ "title": "C" }))
            .with_json(
                paths.chapter_resource("senja", "04"),
                json!({ "title": "D", "published": false }),
            );
        let catalog = resolve_single(&source, &paths, "senja", "03").unwrap();
        let adj = adjacency_confirmed(&source, &SiteConfig::default(), &catalog, "03").unwrap();
        assert_eq!(adj.prev, target("01"));
        assert!(adj.next.is_boundary());

        let catalog = resolve_single(&source, &paths, "senja", "01").unwrap();
        let adj = adjacency_confirmed(&source, &SiteConfig::default(), &catalog, "01").unwrap();
        assert!(adj.prev.is_boundary());
        assert_eq!(adj.next, target("03"));
    }

    #[test]
    fn following_next_link_resolves_same_record_as_direct_lookup() {
        let chapters: Vec<Chapter> = (1..=9).map(|n| chapter(&chapter_code(n))).collect();
        let catalog = ChapterCatalog::new("senja", CatalogOrigin::Aggregate, chapters);

        let from_six = adjacency(&catalog, "06").unwrap();
        let next_code = from_six.next.code().unwrap();
        let via_link = locate(&catalog, next_code).unwrap();
        let direct = locate(&catalog, "07").unwrap();
        assert_eq!(via_link, direct);
        assert_eq!(direct.1.code, "07");
    }
}
