//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching of decoded variants with LRU eviction
//! - Disk caching of raw bytes for persistence
//! - Async image loading pipeline

pub mod disk_cache;
pub mod loader;
pub mod memory_cache;

pub use disk_cache::DiskImageCache;
pub use loader::{ImageLoadedEvent, ImageLoader, ImageLoaderConfig, ImageRequest};
pub use memory_cache::{CacheStats, MemoryImageCache};
