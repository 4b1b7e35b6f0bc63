use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Local-filesystem object store standing in for the original's cloud
/// bucket — scripts and audio are written under `root` and served back
/// out from `public_base_url` (spec §3, `PodcastArtifact.script_url` /
/// `audio_url`).
pub struct ObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into(),
        })
    }

    /// Write `bytes` under `key` (may contain `/`, creating subdirectories)
    /// and return the public URL the caller should store on the artifact.
    pub fn put_object(&self, key: &str, bytes: &[u8]) -> Result<String> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        debug!(key, bytes = bytes.len(), "object written");
        Ok(self.url_for(key))
    }

    pub fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_object_writes_and_builds_url() {
        let dir = tempdir("put-object");
        let store = ObjectStore::new(dir.clone(), "http://localhost:8787/objects").unwrap();
        let url = store.put_object("scripts/u1/run1.txt", b"hello").unwrap();
        assert_eq!(url, "http://localhost:8787/objects/scripts/u1/run1.txt");
        let contents = std::fs::read(store.path_for("scripts/u1/run1.txt")).unwrap();
        assert_eq!(contents, b"hello");
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn url_for_strips_duplicate_slashes() {
        let dir = tempdir("url-for");
        let store = ObjectStore::new(dir.clone(), "http://localhost:8787/objects/").unwrap();
        assert_eq!(
            store.url_for("/audio/u1/run1.mp3"),
            "http://localhost:8787/objects/audio/u1/run1.mp3"
        );
        std::fs::remove_dir_all(dir).ok();
    }

    fn tempdir(label: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("prysm-store-test-{}-{}", std::process::id(), label));
        p
    }
}
