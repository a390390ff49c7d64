//! Read-through cache of loaded tables, keyed by file path.

use super::read_csv;
use crate::error::Result;
use parking_lot::RwLock;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Identifies one version of a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileFingerprint {
    fn of(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

struct CacheEntry {
    fingerprint: FileFingerprint,
    frame: DataFrame,
}

/// Shared cache of parsed CSV files.
///
/// A cached table is re-read only when the file's size or modification
/// time changes. Callers always get their own clone of the frame.
#[derive(Default)]
pub struct DatasetCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

static_assertions::assert_impl_all!(DatasetCache: Send, Sync);

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for `path`, reading the file only if needed.
    pub fn get_or_load(&self, path: &Path) -> Result<DataFrame> {
        let key = path.canonicalize()?;
        let fingerprint = FileFingerprint::of(&key)?;

        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(&key)
                && entry.fingerprint == fingerprint
            {
                debug!("Cache hit: {}", key.display());
                return Ok(entry.frame.clone());
            }
        }

        debug!("Cache miss: {}", key.display());
        let frame = read_csv(&key)?;
        self.entries.write().insert(
            key,
            CacheEntry {
                fingerprint,
                frame: frame.clone(),
            },
        );
        Ok(frame)
    }

    /// Drop the cached table for `path`, if any.
    pub fn invalidate(&self, path: &Path) {
        if let Ok(key) = path.canonicalize() {
            self.entries.write().remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("health-analysis-cache-{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("diabetes.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_cache_hit_returns_same_table() {
        let path = scratch_file("hit", "Glucose,Outcome\n90,0\n200,1\n");
        let cache = DatasetCache::new();

        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(first.equals(&second));
    }

    #[test]
    fn test_cache_reloads_when_file_changes() {
        let path = scratch_file("change", "Glucose,Outcome\n90,0\n");
        let cache = DatasetCache::new();
        assert_eq!(cache.get_or_load(&path).unwrap().height(), 1);

        fs::write(&path, "Glucose,Outcome\n90,0\n200,1\n150,1\n").unwrap();
        assert_eq!(cache.get_or_load(&path).unwrap().height(), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate() {
        let path = scratch_file("invalidate", "Glucose,Outcome\n90,0\n");
        let cache = DatasetCache::new();
        cache.get_or_load(&path).unwrap();
        cache.invalidate(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let cache = DatasetCache::new();
        assert!(cache.get_or_load(Path::new("/no/such/file.csv")).is_err());
        assert!(cache.is_empty());
    }
}
