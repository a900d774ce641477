//! Content fetching.
//!
//! [`ContentSource`] is the only point of I/O in the crate. A fetch either
//! yields a parsed JSON document or `None`; transport failures, missing
//! resources and malformed bodies all collapse to `None` after being logged.
//! Sources never memoize, so every call observes the current content.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{list_field, HomeContent, Loaded, Novel, SiteSettings, Writing};

/// Resource layout of a site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPaths {
    pub settings: String,
    pub home: String,
    pub works: String,
    pub writings: String,
    /// Folder holding chapter documents, with a trailing `/`.
    pub chapters_folder: String,
}

impl Default for ContentPaths {
    fn default() -> Self {
        Self {
            settings: "content/settings/settings_general.json".to_string(),
            home: "content/home/home.json".to_string(),
            works: "content/works/works.json".to_string(),
            writings: "content/writings/writings.json".to_string(),
            chapters_folder: "content/chapters/".to_string(),
        }
    }
}

impl ContentPaths {
    /// Ensure the chapters folder ends with exactly one `/`.
    pub fn normalized(mut self) -> Self {
        let trimmed = self.chapters_folder.trim().trim_end_matches('/');
        self.chapters_folder = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}/", trimmed)
        };
        self
    }

    /// Aggregate chapter document: `<folder><slug>.json`.
    pub fn aggregate_chapters(&self, novel_slug: &str) -> String {
        format!("{}{}.json", self.chapters_folder, novel_slug)
    }

    /// Per-chapter document: `<folder><slug>-<code>.json`.
    pub fn chapter_resource(&self, novel_slug: &str, code: &str) -> String {
        format!("{}{}-{}.json", self.chapters_folder, novel_slug, code)
    }
}

/// Resolves a relative resource path to a JSON document.
pub trait ContentSource {
    /// Fetch and parse `path`; any failure yields `None`.
    fn fetch_json(&self, path: &str) -> Option<Value>;
}

impl<T: ContentSource + ?Sized> ContentSource for &T {
    fn fetch_json(&self, path: &str) -> Option<Value> {
        (**self).fetch_json(path)
    }
}

impl<T: ContentSource + ?Sized> ContentSource for Box<T> {
    fn fetch_json(&self, path: &str) -> Option<Value> {
        (**self).fetch_json(path)
    }
}

/// Relative paths only; no `..`, no roots, no prefixes.
fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn parse_body(path: &str, body: &[u8]) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("malformed JSON in {}: {}", path, err);
            None
        }
    }
}

/// Content rooted in a local directory.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentSource for DirSource {
    fn fetch_json(&self, path: &str) -> Option<Value> {
        if !is_safe_relative(path) {
            log::warn!("rejected content path {:?}", path);
            return None;
        }
        let full = self.root.join(path);
        match std::fs::read(&full) {
            Ok(bytes) => parse_body(path, &bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("content not found: {}", path);
                None
            }
            Err(err) => {
                log::warn!("failed to read {}: {}", full.display(), err);
                None
            }
        }
    }
}

#[derive(Clone, Debug)]
enum MemoryBody {
    Json(Value),
    Raw(String),
}

/// In-memory content, recording every fetch attempt.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: BTreeMap<String, MemoryBody>,
    log: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with_json(mut self, path: impl Into<String>, doc: Value) -> Self {
        self.insert(path, doc);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, doc: Value) {
        self.docs.insert(path.into(), MemoryBody::Json(doc));
    }

    /// Store an unparsed body; invalid JSON behaves like a malformed response.
    pub fn insert_raw(&mut self, path: impl Into<String>, body: impl Into<String>) {
        self.docs.insert(path.into(), MemoryBody::Raw(body.into()));
    }

    pub fn remove(&mut self, path: &str) {
        self.docs.remove(path);
    }

    /// Number of fetch attempts since construction or the last reset.
    pub fn fetch_count(&self) -> usize {
        self.log.lock().map(|log| log.len()).unwrap_or_default()
    }

    /// Paths fetched, in request order.
    pub fn fetched_paths(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn reset_log(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl ContentSource for MemorySource {
    fn fetch_json(&self, path: &str) -> Option<Value> {
        if let Ok(mut log) = self.log.lock() {
            log.push(path.to_string());
        }
        match self.docs.get(path)? {
            MemoryBody::Json(value) => Some(value.clone()),
            MemoryBody::Raw(body) => parse_body(path, body.as_bytes()),
        }
    }
}

/// Content served over HTTP(S) below a base URL.
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
#[derive(Clone, Debug)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::blocking::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, client }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(feature = "http")]
impl ContentSource for HttpSource {
    fn fetch_json(&self, path: &str) -> Option<Value> {
        use reqwest::header::{CACHE_CONTROL, PRAGMA};

        let url = self.url_for(path);
        let response = match self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
        {
            Ok(response) => response,
            Err(err) => {
                log::warn!("request failed for {}: {}", url, err);
                return None;
            }
        };
        let status = response.status();
        if !status.is_success() {
            log::warn!("unexpected status {} for {}", status, url);
            return None;
        }
        match response.bytes() {
            Ok(body) => parse_body(path, &body),
            Err(err) => {
                log::warn!("failed to read body of {}: {}", url, err);
                None
            }
        }
    }
}

/// Asynchronous directory source for loading independent documents together.
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
#[derive(Clone, Debug)]
pub struct AsyncDirSource {
    root: PathBuf,
}

#[cfg(feature = "async")]
impl AsyncDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Async counterpart of [`ContentSource::fetch_json`].
    pub async fn fetch_json(&self, path: &str) -> Option<Value> {
        if !is_safe_relative(path) {
            log::warn!("rejected content path {:?}", path);
            return None;
        }
        match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => parse_body(path, &bytes),
            Err(err) => {
                log::debug!("content unavailable: {}: {}", path, err);
                None
            }
        }
    }
}

/// Branding and hero content shared by every page shell.
#[cfg(feature = "async")]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteShell {
    pub settings: Option<SiteSettings>,
    pub home: Option<HomeContent>,
}

/// Load settings and home documents concurrently.
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub async fn load_site_shell(source: &AsyncDirSource, paths: &ContentPaths) -> SiteShell {
    let (settings, home) = tokio::join!(
        source.fetch_json(&paths.settings),
        source.fetch_json(&paths.home)
    );
    SiteShell {
        settings: settings.and_then(|doc| parse_object(&paths.settings, doc)),
        home: home.and_then(|doc| parse_object(&paths.home, doc)),
    }
}

fn parse_object<T>(path: &str, doc: Value) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    if !doc.is_object() {
        log::warn!("expected an object in {}", path);
        return None;
    }
    match serde_json::from_value::<T>(doc) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::warn!("unexpected shape in {}: {}", path, err);
            None
        }
    }
}

/// Branding settings, if the document is available.
pub fn load_settings<S: ContentSource + ?Sized>(
    source: &S,
    paths: &ContentPaths,
) -> Option<SiteSettings> {
    parse_object(&paths.settings, source.fetch_json(&paths.settings)?)
}

/// Home document, if available.
pub fn load_home<S: ContentSource + ?Sized>(
    source: &S,
    paths: &ContentPaths,
) -> Option<HomeContent> {
    parse_object(&paths.home, source.fetch_json(&paths.home)?)
}

fn load_list<S, T>(source: &S, path: &str, field: &str) -> Loaded<T>
where
    S: ContentSource + ?Sized,
    T: for<'de> Deserialize<'de>,
{
    match source.fetch_json(path) {
        None => Loaded::Unavailable,
        Some(doc) => Loaded::from_items(list_field(&doc, field).unwrap_or_default()),
    }
}

/// Works catalog (`works` list).
pub fn load_works<S: ContentSource + ?Sized>(source: &S, paths: &ContentPaths) -> Loaded<Novel> {
    load_list(source, &paths.works, "works")
}

/// Writings catalog (`writings` list).
pub fn load_writings<S: ContentSource + ?Sized>(
    source: &S,
    paths: &ContentPaths,
) -> Loaded<Writing> {
    load_list(source, &paths.writings, "writings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEMP_NONCE: AtomicUsize = AtomicUsize::new(0);

    fn temp_root(label: &str) -> PathBuf {
        let nonce = TEMP_NONCE.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "titik-fiksi-source-{label}-{}-{nonce}",
            std::process::id()
        ))
    }

    #[test]
    fn paths_build_chapter_resources() {
        let paths = ContentPaths {
            chapters_folder: "data/chapters//".to_string(),
            ..ContentPaths::default()
        }
        .normalized();
        assert_eq!(paths.aggregate_chapters("senja"), "data/chapters/senja.json");
        assert_eq!(
            paths.chapter_resource("senja", "03"),
            "data/chapters/senja-03.json"
        );
    }

    #[test]
    fn memory_source_collapses_malformed_body_to_none() {
        let mut source = MemorySource::new();
        source.insert_raw("bad.json", "{ not json");
        source.insert("good.json", json!({ "ok": true }));

        assert_eq!(source.fetch_json("bad.json"), None);
        assert_eq!(source.fetch_json("missing.json"), None);
        assert_eq!(source.fetch_json("good.json"), Some(json!({ "ok": true })));
        assert_eq!(source.fetch_count(), 3);
        assert_eq!(
            source.fetched_paths(),
            vec!["bad.json", "missing.json", "good.json"]
        );
    }

    #[test]
    fn dir_source_reads_fresh_content_each_time() {
        let root = temp_root("fresh");
        std::fs::create_dir_all(root.join("content")).unwrap();
        let file = root.join("content/doc.json");
        std::fs::write(&file, r#"{ "v": 1 }"#).unwrap();

        let source = DirSource::new(&root);
        assert_eq!(source.fetch_json("content/doc.json"), Some(json!({ "v": 1 })));

        std::fs::write(&file, r#"{ "v": 2 }"#).unwrap();
        assert_eq!(source.fetch_json("content/doc.json"), Some(json!({ "v": 2 })));

        std::fs::write(&file, "garbage").unwrap();
        assert_eq!(source.fetch_json("content/doc.json"), None);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn dir_source_rejects_escaping_paths() {
        let source = DirSource::new(temp_root("escape"));
        assert_eq!(source.fetch_json("../etc/passwd"), None);
        assert_eq!(source.fetch_json("/etc/passwd"), None);
        assert_eq!(source.fetch_json(""), None);
    }

    #[test]
    fn load_works_distinguishes_unavailable_and_empty() {
        let paths = ContentPaths::default();
        let source = MemorySource::new();
        assert_eq!(load_works(&source, &paths), Loaded::Unavailable);

        let source = MemorySource::new().with_json(&paths.works, json!({ "works": [] }));
        assert_eq!(load_works(&source, &paths), Loaded::Empty);

        let source = MemorySource::new().with_json(&paths.works, json!({ "other": 1 }));
        assert_eq!(load_works(&source, &paths), Loaded::Empty);

        let source = MemorySource::new().with_json(
            &paths.works,
            json!({ "works": [ { "slug": "senja", "title": "Senja" } ] }),
        );
        let works = load_works(&source, &paths);
        assert_eq!(works.items().len(), 1);
        assert_eq!(works.items()[0].title, "Senja");
    }

    #[test]
    fn load_settings_requires_an_object() {
        let paths = ContentPaths::default();
        let source = MemorySource::new().with_json(&paths.settings, json!(["x"]));
        assert_eq!(load_settings(&source, &paths), None);

        let source = MemorySource::new().with_json(
            &paths.settings,
            json!({ "brand_logo": "logo.png", "meta_description": "Fiksi" }),
        );
        let settings = load_settings(&source, &paths).unwrap();
        assert_eq!(settings.brand_logo, "logo.png");
        assert_eq!(settings.brand_favicon, "");
    }

    #[test]
    fn load_home_reads_hero_and_social() {
        let paths = ContentPaths::default();
        let source = MemorySource::new().with_json(
            &paths.home,
            json!({
                "hero": { "title": "Halo", "youtube_embed": " " },
                "social": { "instagram": "https://instagram.com/tf" }
            }),
        );
        let home = load_home(&source, &paths).unwrap();
        assert_eq!(home.hero.title, "Halo");
        assert_eq!(home.social["instagram"], "https://instagram.com/tf");
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn site_shell_loads_settings_and_home_together() {
        let root = temp_root("shell");
        let paths = ContentPaths::default();
        std::fs::create_dir_all(root.join("content/settings")).unwrap();
        std::fs::write(
            root.join(&paths.settings),
            r#"{ "site_title": "Titik Fiksi" }"#,
        )
        .unwrap();

        let shell = load_site_shell(&AsyncDirSource::new(&root), &paths).await;
        assert_eq!(
            shell.settings.map(|s| s.site_title),
            Some("Titik Fiksi".to_string())
        );
        assert_eq!(shell.home, None);
        let _ = std::fs::remove_dir_all(root);
    }
}
