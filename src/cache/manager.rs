//! Persistent image URL cache
//!
//! Stores resolved title-to-image-URL pairs in a single JSON snapshot on
//! disk so repeat queries skip the catalog entirely. The snapshot carries
//! ONE shared timestamp: every flush restamps it, which extends the
//! effective lifetime of every entry already in the map. That matches the
//! snapshot format this cache inherited; per-entry expiry would be the
//! alternative if compatibility ever stops mattering.
//!
//! The cache is best-effort throughout: any read, parse, or write failure
//! against the filesystem is logged and treated as a miss / no-op, never
//! surfaced to the pipeline.

use chrono::{Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// File name of the cache snapshot inside the XDG cache directory
const CACHE_FILE: &str = "image_cache.json";

/// How long a snapshot is honored after it was written, in hours
pub const CACHE_EXPIRY_HOURS: i64 = 24;

/// On-disk form of the cache: the full working set plus one shared stamp
#[derive(Debug, Serialize, Deserialize)]
struct CacheSnapshot {
    /// Resolved image URL per title name
    images: HashMap<String, String>,
    /// Epoch milliseconds when the snapshot was written
    timestamp: i64,
}

/// Persistent title-to-image-URL cache with a 24h whole-snapshot expiry
///
/// Holds an in-memory working set that [`merge`](ImageCache::merge)
/// accumulates into during a pipeline run; [`flush`](ImageCache::flush)
/// persists the whole set at once rather than writing per resolution.
#[derive(Debug)]
pub struct ImageCache {
    /// Path of the snapshot file
    path: PathBuf,
    /// In-memory working set
    images: HashMap<String, String>,
}

impl ImageCache {
    /// Creates an ImageCache under the XDG-compliant cache directory
    ///
    /// Uses `~/.cache/anirec/image_cache.json` on Linux, or the equivalent
    /// path on other platforms. Returns `None` if the cache directory cannot
    /// be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "anirec")?;
        let path = project_dirs.cache_dir().join(CACHE_FILE);
        Some(Self::with_path(path))
    }

    /// Creates an ImageCache backed by a specific snapshot file
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            images: HashMap::new(),
        }
    }

    /// Loads the on-disk snapshot into the working set.
    ///
    /// An absent or malformed snapshot leaves the working set empty. An
    /// expired snapshot (written [`CACHE_EXPIRY_HOURS`] or more ago) is
    /// discarded and its file deleted. Returns the number of entries
    /// restored.
    pub fn load(&mut self) -> usize {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(err) => {
                log::warn!("failed to read image cache {}: {}", self.path.display(), err);
                return 0;
            }
        };

        let snapshot: CacheSnapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("discarding malformed image cache: {}", err);
                return 0;
            }
        };

        let age_ms = Utc::now().timestamp_millis() - snapshot.timestamp;
        if age_ms >= Duration::hours(CACHE_EXPIRY_HOURS).num_milliseconds() {
            log::debug!("image cache snapshot expired, starting cold");
            if let Err(err) = fs::remove_file(&self.path) {
                log::warn!("failed to delete expired image cache: {}", err);
            }
            return 0;
        }

        self.images = snapshot.images;
        self.images.len()
    }

    /// Returns the cached image URL for a title, if present
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.images.get(name).map(String::as_str)
    }

    /// Adds or overwrites one entry in the working set without persisting
    pub fn merge(&mut self, name: impl Into<String>, image_url: impl Into<String>) {
        self.images.insert(name.into(), image_url.into());
    }

    /// Whether the working set holds no entries
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Persists the full working set, restamping the shared timestamp.
    ///
    /// Overwrites any previous snapshot. Write failures are logged and
    /// swallowed.
    pub fn flush(&self) {
        let snapshot = CacheSnapshot {
            images: self.images.clone(),
            timestamp: Utc::now().timestamp_millis(),
        };

        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("failed to serialize image cache: {}", err);
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::warn!("failed to create cache directory: {}", err);
                return;
            }
        }

        if let Err(err) = fs::write(&self.path, json) {
            log::warn!("failed to write image cache {}: {}", self.path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (ImageCache, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = ImageCache::with_path(temp_dir.path().join(CACHE_FILE));
        (cache, temp_dir)
    }

    #[test]
    fn test_load_returns_zero_for_missing_snapshot() {
        let (mut cache, _temp_dir) = create_test_cache();
        assert_eq!(cache.load(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_flush_then_load_round_trips_entries() {
        let (mut cache, temp_dir) = create_test_cache();
        cache.merge("Naruto", "https://cdn.example/naruto.jpg");
        cache.merge("Bleach", "https://cdn.example/bleach.jpg");
        cache.flush();

        let mut reloaded = ImageCache::with_path(temp_dir.path().join(CACHE_FILE));
        assert_eq!(reloaded.load(), 2);
        assert_eq!(
            reloaded.lookup("Naruto"),
            Some("https://cdn.example/naruto.jpg")
        );
        assert_eq!(
            reloaded.lookup("Bleach"),
            Some("https://cdn.example/bleach.jpg")
        );
    }

    #[test]
    fn test_lookup_misses_unknown_name() {
        let (mut cache, _temp_dir) = create_test_cache();
        cache.merge("Naruto", "https://cdn.example/naruto.jpg");
        assert!(cache.lookup("One Piece").is_none());
    }

    #[test]
    fn test_merge_overwrites_existing_entry() {
        let (mut cache, _temp_dir) = create_test_cache();
        cache.merge("Naruto", "https://cdn.example/old.jpg");
        cache.merge("Naruto", "https://cdn.example/new.jpg");
        assert_eq!(cache.lookup("Naruto"), Some("https://cdn.example/new.jpg"));
    }

    #[test]
    fn test_expired_snapshot_is_discarded_and_deleted() {
        let (_, temp_dir) = create_test_cache();
        let path = temp_dir.path().join(CACHE_FILE);

        // Write a snapshot aged just past the expiry window
        let stale_ms = Utc::now().timestamp_millis()
            - Duration::hours(CACHE_EXPIRY_HOURS).num_milliseconds()
            - 1;
        let snapshot = CacheSnapshot {
            images: HashMap::from([("Naruto".to_string(), "https://x/naruto.jpg".to_string())]),
            timestamp: stale_ms,
        };
        fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let mut cache = ImageCache::with_path(path.clone());
        assert_eq!(cache.load(), 0);
        assert!(cache.lookup("Naruto").is_none());
        assert!(!path.exists(), "Expired snapshot file should be deleted");
    }

    #[test]
    fn test_fresh_snapshot_honors_all_entries() {
        let (_, temp_dir) = create_test_cache();
        let path = temp_dir.path().join(CACHE_FILE);

        // Almost a day old, but still inside the window
        let recent_ms = Utc::now().timestamp_millis()
            - Duration::hours(CACHE_EXPIRY_HOURS - 1).num_milliseconds();
        let snapshot = CacheSnapshot {
            images: HashMap::from([("Naruto".to_string(), "https://x/naruto.jpg".to_string())]),
            timestamp: recent_ms,
        };
        fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let mut cache = ImageCache::with_path(path);
        assert_eq!(cache.load(), 1);
        assert_eq!(cache.lookup("Naruto"), Some("https://x/naruto.jpg"));
    }

    #[test]
    fn test_malformed_snapshot_is_treated_as_miss() {
        let (_, temp_dir) = create_test_cache();
        let path = temp_dir.path().join(CACHE_FILE);
        fs::write(&path, "{not json").unwrap();

        let mut cache = ImageCache::with_path(path);
        assert_eq!(cache.load(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_flush_restamps_shared_timestamp() {
        let (mut cache, temp_dir) = create_test_cache();
        let path = temp_dir.path().join(CACHE_FILE);

        cache.merge("Naruto", "https://x/naruto.jpg");
        let before = Utc::now().timestamp_millis();
        cache.flush();
        let after = Utc::now().timestamp_millis();

        let content = fs::read_to_string(&path).unwrap();
        let snapshot: CacheSnapshot = serde_json::from_str(&content).unwrap();
        assert!(snapshot.timestamp >= before && snapshot.timestamp <= after);
    }

    #[test]
    fn test_flush_creates_parent_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("dir").join(CACHE_FILE);
        let mut cache = ImageCache::with_path(path.clone());

        cache.merge("Naruto", "https://x/naruto.jpg");
        cache.flush();

        assert!(path.exists(), "Snapshot should be written under nested dirs");
    }
}
