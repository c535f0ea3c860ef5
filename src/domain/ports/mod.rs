mod gallery_port;
mod image_cache_port;

pub use gallery_port::GalleryPort;
pub use image_cache_port::{CacheError, CacheResult, ImageCachePort};
