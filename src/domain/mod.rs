//! Domain layer with core entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Keybinding definitions.
pub mod keybinding;
/// Port definitions.
pub mod ports;

pub use entities::{CheckinMetadata, GalleryImage, ImagePage, StarRating};
pub use errors::GalleryError;
pub use ports::{GalleryPort, ImageCachePort};
