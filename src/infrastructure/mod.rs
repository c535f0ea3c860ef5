//! Infrastructure layer with external service adapters.

/// System clipboard access.
pub mod clipboard;
/// Application configuration.
pub mod config;
/// Image listing HTTP client.
pub mod gallery;
/// Image handling (caching, loading).
pub mod image;

pub use clipboard::ClipboardService;
pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use gallery::GalleryClient;
pub use image::{
    CacheStats, DiskImageCache, ImageLoadedEvent, ImageLoader, ImageLoaderConfig, ImageRequest,
    MemoryImageCache,
};
