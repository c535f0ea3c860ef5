//! Disk cache of raw image bytes, persisted across sessions.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::SystemTime;

use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::entities::ImageId;
use crate::domain::ports::{CacheError, CacheResult};

/// Maximum disk cache size in bytes (200 MB default).
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 200 * 1024 * 1024;

const ENTRY_EXTENSION: &str = "img";
const PARTIAL_EXTENSION: &str = "part";

/// Size-bounded directory of downloaded image files.
///
/// Entries are written to a temporary file and renamed into place, so a
/// crash never leaves a truncated entry behind. When the total size exceeds
/// the limit, the least recently written entries are removed until the cache
/// is 10% under it.
pub struct DiskImageCache {
    cache_dir: PathBuf,
    max_size: u64,
    current_size: AtomicU64,
    item_count: AtomicUsize,
}

fn is_entry(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
}

impl DiskImageCache {
    /// Opens (or creates) a cache in the specified directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created or read.
    pub async fn new(cache_dir: PathBuf, max_size: u64) -> CacheResult<Self> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to create cache dir: {e}")))?;

        let mut total_size = 0u64;
        let mut count = 0usize;

        let mut entries = fs::read_dir(&cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to read cache dir: {e}")))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == PARTIAL_EXTENSION)
            {
                let _ = fs::remove_file(&path).await;
                continue;
            }
            if is_entry(&path)
                && let Ok(meta) = entry.metadata().await
            {
                total_size += meta.len();
                count += 1;
            }
        }

        debug!(
            dir = %cache_dir.display(),
            size = total_size,
            count,
            "Opened disk image cache"
        );

        let cache = Self {
            cache_dir,
            max_size,
            current_size: AtomicU64::new(total_size),
            item_count: AtomicUsize::new(count),
        };

        cache.prune().await;

        Ok(cache)
    }

    /// Opens the cache in the platform cache directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created.
    pub async fn default_location(max_size: u64) -> CacheResult<Self> {
        Self::new(default_cache_dir(), max_size).await
    }

    fn entry_path(&self, id: &ImageId) -> PathBuf {
        self.cache_dir.join(format!("{}.{ENTRY_EXTENSION}", id.as_str()))
    }

    /// Reads the raw bytes of an entry.
    pub async fn read(&self, id: &ImageId) -> Option<Vec<u8>> {
        let path = self.entry_path(id);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(id = %id, "Disk cache hit");
                Some(bytes)
            }
            Err(_) => {
                trace!(id = %id, "Disk cache miss");
                None
            }
        }
    }

    /// Writes an entry, replacing any previous one.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub async fn write(&self, id: &ImageId, bytes: &[u8]) -> CacheResult<()> {
        let path = self.entry_path(id);
        let partial = path.with_extension(PARTIAL_EXTENSION);

        let old_size = fs::metadata(&path).await.map(|m| m.len()).ok();

        fs::write(&partial, bytes)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to write cache file: {e}")))?;
        fs::rename(&partial, &path)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to move cache file: {e}")))?;

        let new_size = bytes.len() as u64;
        match old_size {
            Some(old) => {
                self.current_size.fetch_add(new_size, Ordering::Relaxed);
                self.current_size.fetch_sub(old, Ordering::Relaxed);
            }
            None => {
                self.current_size.fetch_add(new_size, Ordering::Relaxed);
                self.item_count.fetch_add(1, Ordering::Relaxed);
            }
        }

        debug!(id = %id, size = new_size, "Stored image on disk");

        self.prune().await;

        Ok(())
    }

    /// Removes an entry.
    pub async fn remove(&self, id: &ImageId) {
        let path = self.entry_path(id);
        let size = fs::metadata(&path).await.map(|m| m.len()).ok();
        match fs::remove_file(&path).await {
            Ok(()) => {
                if let Some(s) = size {
                    self.current_size.fetch_sub(s, Ordering::Relaxed);
                    self.item_count.fetch_sub(1, Ordering::Relaxed);
                }
                debug!(id = %id, "Removed image from disk cache");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(id = %id, error = %e, "Failed to remove disk cache entry"),
        }
    }

    /// Removes every entry.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be read.
    pub async fn clear(&self) -> CacheResult<()> {
        let mut entries = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to read cache dir: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to read entry: {e}")))?
        {
            let path = entry.path();
            if is_entry(&path) && fs::remove_file(&path).await.is_err() {
                warn!(path = %path.display(), "Failed to remove cache file");
            }
        }
        self.current_size.store(0, Ordering::Relaxed);
        self.item_count.store(0, Ordering::Relaxed);
        debug!("Cleared disk cache");
        Ok(())
    }

    /// Total size of all entries in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.current_size.load(Ordering::Relaxed)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if an entry exists.
    pub async fn contains(&self, id: &ImageId) -> bool {
        fs::try_exists(self.entry_path(id)).await.unwrap_or(false)
    }

    async fn prune(&self) {
        let current_size = self.size();
        if current_size <= self.max_size {
            return;
        }

        debug!(
            current_size,
            max_size = self.max_size,
            "Disk cache over limit, pruning"
        );

        let Ok(mut entries) = fs::read_dir(&self.cache_dir).await else {
            return;
        };

        let mut files: Vec<(PathBuf, SystemTime, u64)> = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !is_entry(&path) {
                continue;
            }
            if let Ok(meta) = entry.metadata().await {
                let written = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                files.push((path, written, meta.len()));
            }
        }

        files.sort_by_key(|(_, written, _)| *written);

        let target = current_size - self.max_size + (self.max_size / 10);
        let mut freed_size = 0u64;
        let mut freed_count = 0usize;

        for (path, _, size) in files {
            if freed_size >= target {
                break;
            }
            match fs::remove_file(&path).await {
                Ok(()) => {
                    freed_size += size;
                    freed_count += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to prune cache file"),
            }
        }

        self.current_size.fetch_sub(freed_size, Ordering::Relaxed);
        self.item_count.fetch_sub(freed_count, Ordering::Relaxed);

        debug!(freed_size, freed_count, "Disk cache pruned");
    }
}

/// Returns the default cache directory path.
fn default_cache_dir() -> PathBuf {
    use super::super::config::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER};

    directories::ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
        || std::env::temp_dir().join(APP_NAME).join("images"),
        |dirs| dirs.cache_dir().join("images"),
    )
}
