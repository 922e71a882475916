use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use crate::scanner::report::Finding;

/// Content-addressed result cache. The key is a digest of the file's raw
/// bytes, so a hit is always byte-identical to a fresh scan of that content;
/// a changed file simply produces a new key. Strictly best-effort: every
/// failure degrades to a miss or a dropped write.
pub struct ScanCache {
    dir: Option<PathBuf>,
}

impl ScanCache {
    /// `None` disables caching entirely.
    pub fn new(dir: Option<PathBuf>) -> Self {
        if let Some(dir) = &dir {
            let _ = fs::create_dir_all(dir);
        }
        Self { dir }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// SHA-256 hex digest of the full raw content.
    pub fn content_key(content: &[u8]) -> String {
        format!("{:x}", Sha256::digest(content))
    }

    fn record_path(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{key}.json")))
    }

    pub fn load(&self, key: &str) -> Option<Vec<Finding>> {
        let path = self.record_path(key)?;
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    pub fn store(&self, key: &str, findings: &[Finding]) {
        let Some(path) = self.record_path(key) else {
            return;
        };
        if let Ok(json) = serde_json::to_string(findings) {
            let _ = fs::write(path, json);
        }
    }
}
