//! Content records read from the site's JSON documents.
//!
//! Every field is optional on the wire. Strings tolerate `null` and numbers so
//! a partially filled document still loads; presence is the only check.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SiteError;

/// A novel listed in the works catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Novel {
    #[serde(deserialize_with = "lenient_string")]
    pub slug: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub genre: String,
    /// Free-form label such as `Ongoing` or `Completed`.
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub synopsis: String,
    /// Cover image reference; empty means the default cover asset.
    #[serde(deserialize_with = "lenient_string")]
    pub cover: String,
}

impl Novel {
    /// Slug as used for lookups and chapter resource names.
    pub fn normalized_slug(&self) -> String {
        normalize_slug(&self.slug)
    }
}

/// A short writing listed in the writings catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Writing {
    #[serde(deserialize_with = "lenient_string")]
    pub slug: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub content: String,
}

impl Writing {
    pub fn normalized_slug(&self) -> String {
        normalize_slug(&self.slug)
    }
}

/// One chapter of a novel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chapter {
    /// Sequence code used for ordering and URLs (`01`, `02`, ... when probed).
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub content: String,
    /// Tri-state publish flag; only JSON booleans count.
    #[serde(deserialize_with = "lenient_bool")]
    pub published: Option<bool>,
    /// External reading destinations keyed by platform name.
    #[serde(deserialize_with = "lenient_links")]
    pub links: BTreeMap<String, String>,
}

impl Chapter {
    /// Aggregate documents only expose chapters flagged `published: true`.
    pub fn is_published_strict(&self) -> bool {
        self.published == Some(true)
    }

    /// Per-chapter resources hide a chapter only on an explicit `false`.
    pub fn is_published_lenient(&self) -> bool {
        self.published != Some(false)
    }
}

/// Branding fields from the settings document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    #[serde(deserialize_with = "lenient_string")]
    pub brand_logo: String,
    #[serde(deserialize_with = "lenient_string")]
    pub brand_favicon: String,
    #[serde(deserialize_with = "lenient_string")]
    pub site_title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub meta_description: String,
}

/// Homepage hero block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hero {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subtitle: String,
    #[serde(deserialize_with = "lenient_string")]
    pub intro: String,
    /// Embed URL for the hero video frame.
    #[serde(deserialize_with = "lenient_string")]
    pub youtube_embed: String,
}

/// The home document: hero plus optional social links.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeContent {
    pub hero: Hero,
    #[serde(deserialize_with = "lenient_links")]
    pub social: BTreeMap<String, String>,
}

/// Outcome of loading a list-shaped catalog document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Loaded<T> {
    /// The document could not be fetched or parsed.
    Unavailable,
    /// The document loaded but its list is missing or empty.
    Empty,
    /// At least one entry.
    Items(Vec<T>),
}

impl<T> Loaded<T> {
    /// Wrap a list, mapping an empty one to [`Loaded::Empty`].
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Items(items)
        }
    }

    /// Entries, or an empty slice for the other states.
    pub fn items(&self) -> &[T] {
        match self {
            Self::Items(items) => items,
            _ => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Entries, or the error naming the document at `path` and its catalog.
    pub fn require(self, path: &str, what: &'static str) -> Result<Vec<T>, SiteError> {
        match self {
            Self::Items(items) => Ok(items),
            Self::Empty => Err(SiteError::CatalogEmpty { what }),
            Self::Unavailable => Err(SiteError::ResourceUnavailable {
                path: path.to_string(),
            }),
        }
    }
}

/// Trim and lowercase a slug.
pub fn normalize_slug(slug: &str) -> String {
    slug.trim().to_lowercase()
}

/// Deserialize every entry of `doc[field]` that parses as `T`.
///
/// Returns `None` when the field is missing or not a list. Entries that are
/// not objects or fail to parse are skipped.
pub(crate) fn list_field<T>(doc: &Value, field: &str) -> Option<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let entries = doc.get(field)?.as_array()?;
    let mut out = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            log::debug!("skipping non-object entry {} in '{}'", idx, field);
            continue;
        }
        match T::deserialize(entry) {
            Ok(item) => out.push(item),
            Err(err) => log::warn!("skipping malformed entry {} in '{}': {}", idx, field, err),
        }
    }
    Some(out)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}

fn lenient_links<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    if let Value::Object(map) = value {
        for (name, target) in map {
            let target = value_to_string(&target);
            if !target.trim().is_empty() {
                out.insert(name, target.trim().to_string());
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chapter_tolerates_numeric_code_and_null_fields() {
        let chapter: Chapter = serde_json::from_value(json!({
            "code": 7,
            "title": null,
            "content": "Isi",
            "published": true
        }))
        .unwrap();
        assert_eq!(chapter.code, "7");
        assert_eq!(chapter.title, "");
        assert!(chapter.is_published_strict());
    }

    #[test]
    fn publish_flag_is_tri_state() {
        let absent: Chapter = serde_json::from_value(json!({ "code": "01" })).unwrap();
        assert_eq!(absent.published, None);
        assert!(!absent.is_published_strict());
        assert!(absent.is_published_lenient());

        let stringly: Chapter =
            serde_json::from_value(json!({ "code": "01", "published": "false" })).unwrap();
        assert_eq!(stringly.published, None);
        assert!(stringly.is_published_lenient());

        let hidden: Chapter =
            serde_json::from_value(json!({ "code": "01", "published": false })).unwrap();
        assert!(!hidden.is_published_lenient());
    }

    #[test]
    fn links_drop_empty_destinations() {
        let chapter: Chapter = serde_json::from_value(json!({
            "code": "01",
            "links": { "wattpad": "https://wattpad.com/x", "karyakarsa": "", "fizzo": null }
        }))
        .unwrap();
        assert_eq!(chapter.links.len(), 1);
        assert_eq!(chapter.links["wattpad"], "https://wattpad.com/x");
    }

    #[test]
    fn list_field_skips_malformed_entries() {
        let doc = json!({ "works": [ { "slug": "a" }, 3, null, { "slug": "b", "title": ["x"] } ] });
        let works: Vec<Novel> = list_field(&doc, "works").unwrap();
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].slug, "a");
        assert_eq!(works[1].title, "");
        assert!(list_field::<Novel>(&doc, "missing").is_none());
    }

    #[test]
    fn loaded_from_items_maps_empty() {
        assert_eq!(Loaded::<Novel>::from_items(Vec::new()), Loaded::Empty);
        assert_eq!(Loaded::from_items(vec![1]).items(), &[1]);
    }

    #[test]
    fn require_reports_why_a_catalog_has_no_entries() {
        let err = Loaded::<Novel>::Unavailable
            .require("content/works/works.json", "works")
            .expect_err("nothing loaded");
        assert_eq!(err.code(), "resource_unavailable");
        assert_eq!(
            err.to_string(),
            "resource_unavailable: resource unavailable [path=content/works/works.json]"
        );

        let err = Loaded::<Novel>::Empty
            .require("content/works/works.json", "works")
            .expect_err("no entries");
        assert_eq!(err, SiteError::CatalogEmpty { what: "works" });
        assert_eq!(Loaded::Items(vec![7]).require("x", "works"), Ok(vec![7]));
    }
}
