//! In-memory LRU cache of decoded images.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::ImageId;
use crate::domain::ports::ImageCachePort;

/// Default maximum number of images to cache in memory.
pub const DEFAULT_CACHE_SIZE: usize = 80;

/// Default budget for decoded pixel data (256 MB).
pub const DEFAULT_MAX_BYTES: u64 = 256 * 1024 * 1024;

struct Entries {
    lru: LruCache<ImageId, Arc<image::DynamicImage>>,
    bytes: u64,
}

/// LRU cache for decoded images, bounded by entry count and pixel bytes.
///
/// Full-resolution viewer images are much larger than grid thumbnails, so a
/// count limit alone does not bound memory.
pub struct MemoryImageCache {
    entries: RwLock<Entries>,
    max_bytes: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

fn decoded_size(image: &image::DynamicImage) -> u64 {
    image.as_bytes().len() as u64
}

impl MemoryImageCache {
    /// Creates a new cache with the given limits.
    #[must_use]
    pub fn new(capacity: usize, max_bytes: u64) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(Entries {
                lru: LruCache::new(cap),
                bytes: 0,
            }),
            max_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a cache holding up to `capacity` images within the default byte budget.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, DEFAULT_MAX_BYTES)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let (size, bytes) = self
            .entries
            .try_read()
            .map(|e| (e.lru.len(), e.bytes))
            .unwrap_or((0, 0));
        CacheStats {
            hits,
            misses,
            hit_rate,
            size,
            bytes,
        }
    }

    /// Looks up an image without promoting it in the LRU order.
    pub async fn peek(&self, id: &ImageId) -> Option<Arc<image::DynamicImage>> {
        let entries = self.entries.read().await;
        entries.lru.peek(id).cloned()
    }

    /// Returns true if the image is cached.
    pub async fn contains(&self, id: &ImageId) -> bool {
        self.entries.read().await.lru.contains(id)
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE, DEFAULT_MAX_BYTES)
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Decoded bytes held.
    pub bytes: u64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images ({} KiB), {:.1}% hit rate ({} hits, {} misses)",
            self.size,
            self.bytes / 1024,
            self.hit_rate,
            self.hits,
            self.misses
        )
    }
}

#[async_trait::async_trait]
impl ImageCachePort for MemoryImageCache {
    async fn get(&self, id: &ImageId) -> Option<Arc<image::DynamicImage>> {
        let mut entries = self.entries.write().await;
        if let Some(img) = entries.lru.get(id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache hit");
            Some(img.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache miss");
            None
        }
    }

    async fn put(&self, id: ImageId, image: Arc<image::DynamicImage>) {
        let size = decoded_size(&image);
        let mut entries = self.entries.write().await;

        if let Some((_, replaced)) = entries.lru.push(id.clone(), image) {
            entries.bytes = entries.bytes.saturating_sub(decoded_size(&replaced));
        }
        entries.bytes += size;

        while entries.bytes > self.max_bytes && entries.lru.len() > 1 {
            let Some((evicted_id, evicted)) = entries.lru.pop_lru() else {
                break;
            };
            entries.bytes = entries.bytes.saturating_sub(decoded_size(&evicted));
            debug!(id = %evicted_id, "Evicted image to stay within memory budget");
        }

        debug!(id = %id, size, total = entries.bytes, "Stored image in memory cache");
    }

    async fn evict(&self, id: &ImageId) {
        let mut entries = self.entries.write().await;
        if let Some(image) = entries.lru.pop(id) {
            entries.bytes = entries.bytes.saturating_sub(decoded_size(&image));
            debug!(id = %id, "Evicted image from memory cache");
        }
    }

    fn len(&self) -> usize {
        // Best-effort: a writer holding the lock reads as empty.
        self.entries.try_read().map(|e| e.lru.len()).unwrap_or(0)
    }

    async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.lru.clear();
        entries.bytes = 0;
        debug!("Cleared memory image cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(width: u32, height: u32) -> Arc<image::DynamicImage> {
        Arc::new(image::DynamicImage::new_rgb8(width, height))
    }

    #[tokio::test]
    async fn test_cache_put_and_get() {
        let cache = MemoryImageCache::with_capacity(10);
        let id = ImageId::new("thumb");

        cache.put(id.clone(), rgb(100, 100)).await;
        let retrieved = cache.get(&id).await;

        assert_eq!(retrieved.map(|img| img.width()), Some(100));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = MemoryImageCache::with_capacity(10);
        assert!(cache.get(&ImageId::new("nonexistent")).await.is_none());
    }

    #[tokio::test]
    async fn test_count_eviction() {
        let cache = MemoryImageCache::with_capacity(2);

        let ids = [ImageId::new("a"), ImageId::new("b"), ImageId::new("c")];
        for id in &ids {
            cache.put(id.clone(), rgb(10, 10)).await;
        }

        assert!(cache.get(&ids[0]).await.is_none());
        assert!(cache.get(&ids[1]).await.is_some());
        assert!(cache.get(&ids[2]).await.is_some());
    }

    #[tokio::test]
    async fn test_byte_budget_eviction() {
        // 10x10 rgb8 = 300 bytes each
        let cache = MemoryImageCache::new(10, 700);

        cache.put(ImageId::new("a"), rgb(10, 10)).await;
        cache.put(ImageId::new("b"), rgb(10, 10)).await;
        cache.put(ImageId::new("c"), rgb(10, 10)).await;

        assert!(!cache.contains(&ImageId::new("a")).await);
        assert!(cache.contains(&ImageId::new("c")).await);
        assert_eq!(cache.stats().bytes, 600);
    }

    #[tokio::test]
    async fn test_oversized_image_is_still_kept() {
        let cache = MemoryImageCache::new(10, 100);
        cache.put(ImageId::new("big"), rgb(50, 50)).await;
        assert!(cache.contains(&ImageId::new("big")).await);
    }

    #[tokio::test]
    async fn test_replacing_entry_updates_bytes() {
        let cache = MemoryImageCache::with_capacity(10);
        let id = ImageId::new("a");

        cache.put(id.clone(), rgb(10, 10)).await;
        cache.put(id.clone(), rgb(20, 10)).await;

        assert_eq!(cache.stats().bytes, 600);
        cache.evict(&id).await;
        assert_eq!(cache.stats().bytes, 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let cache = MemoryImageCache::with_capacity(10);
        let id = ImageId::new("a");
        cache.put(id.clone(), rgb(10, 10)).await;

        let _ = cache.get(&id).await;
        let _ = cache.get(&ImageId::new("missing")).await;

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[tokio::test]
    async fn test_peek_does_not_promote() {
        let cache = MemoryImageCache::with_capacity(2);
        let a = ImageId::new("a");

        cache.put(a.clone(), rgb(10, 10)).await;
        cache.put(ImageId::new("b"), rgb(10, 10)).await;
        let _ = cache.peek(&a).await;
        cache.put(ImageId::new("c"), rgb(10, 10)).await;

        assert!(cache.peek(&a).await.is_none());
    }
}
