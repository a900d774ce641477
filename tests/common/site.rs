use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{json, Value};

static NEXT_SITE: AtomicUsize = AtomicUsize::new(0);

/// A throwaway site root on disk, removed on drop.
pub struct SiteDir {
    root: PathBuf,
}

impl SiteDir {
    pub fn new(label: &str) -> Self {
        let n = NEXT_SITE.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "titik-fiksi-{}-{}-{}",
            label,
            std::process::id(),
            n
        ));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).expect("create site root");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, relative: &str, body: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create content folder");
        }
        std::fs::write(&path, body).expect("write content file");
    }

    pub fn write_json(&self, relative: &str, doc: &Value) {
        self.write(relative, &doc.to_string());
    }

    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.root.join(relative)).expect("remove content file");
    }
}

impl Drop for SiteDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub fn chapter(title: &str, content: &str) -> Value {
    json!({ "title": title, "content": content })
}

pub fn works() -> Value {
    json!({
        "works": [
            {
                "slug": "langit-senja",
                "title": "Langit Senja",
                "genre": "Drama",
                "status": "Ongoing",
                "synopsis": "Kisah di bawah langit senja."
            },
            { "slug": "kabut", "title": "Kabut" }
        ]
    })
}
