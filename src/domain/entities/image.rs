//! Domain types for image loading and caching.

use std::sync::Arc;

/// Unique identifier for a cached image.
/// Generated from a hash of the image URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub String);

impl ImageId {
    /// Creates a new `ImageId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an `ImageId` from a URL by hashing it.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Creates the memory cache key for one decoded variant of a URL.
    ///
    /// Both variants share the same raw bytes on disk, which are keyed by
    /// [`ImageId::from_url`].
    #[must_use]
    pub fn for_variant(url: &str, variant: ImageVariant) -> Self {
        let base = Self::from_url(url);
        Self(format!("{}-{}", base.0, variant.suffix()))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Which decoded form of an image is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageVariant {
    /// Downscaled for a grid card.
    Thumbnail,
    /// Shown in the full-screen viewer.
    Full,
}

impl ImageVariant {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumb",
            Self::Full => "full",
        }
    }
}

/// Status of an image in the loading pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// Image loading has not started.
    #[default]
    NotStarted,
    /// Image is being downloaded from the network.
    Downloading,
    /// Image is being decoded (CPU-intensive).
    Decoding,
    /// Image is fully loaded and ready for display.
    Ready,
    /// Image loading failed with an error message.
    Failed(String),
}

impl ImageStatus {
    /// Returns true if the image is ready for rendering.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if the image is currently being loaded.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Downloading | Self::Decoding)
    }

    /// Returns true if loading failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if loading hasn't started yet.
    #[must_use]
    pub const fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStarted)
    }
}

/// A decoded image together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Cache key of the image.
    pub id: ImageId,
    /// Decoded pixels.
    pub image: Arc<image::DynamicImage>,
    /// Tier that served the image.
    pub source: ImageSource,
}

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Loaded from in-memory LRU cache.
    MemoryCache,
    /// Loaded from disk cache.
    DiskCache,
    /// Downloaded from network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::DiskCache => write!(f, "disk"),
            Self::Network => write!(f, "network"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_from_url() {
        let url = "https://images.example.com/2024/05/checkin.jpg";
        let id = ImageId::from_url(url);
        assert_eq!(id.0.len(), 32);
    }

    #[test]
    fn test_image_id_consistency() {
        let url = "https://example.com/image.png";
        assert_eq!(ImageId::from_url(url), ImageId::from_url(url));
    }

    #[test]
    fn test_variants_have_distinct_ids() {
        let url = "https://example.com/image.png";
        let thumb = ImageId::for_variant(url, ImageVariant::Thumbnail);
        let full = ImageId::for_variant(url, ImageVariant::Full);

        assert_ne!(thumb, full);
        assert!(thumb.as_str().starts_with(ImageId::from_url(url).as_str()));
    }

    #[test]
    fn test_status_predicates() {
        assert!(ImageStatus::NotStarted.is_not_started());
        assert!(ImageStatus::Downloading.is_loading());
        assert!(ImageStatus::Decoding.is_loading());
        assert!(ImageStatus::Ready.is_ready());
        assert!(ImageStatus::Failed("boom".to_string()).is_failed());
    }
}
