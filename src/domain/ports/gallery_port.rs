//! Port for fetching pages of the remote image listing.

use async_trait::async_trait;

use crate::domain::entities::ImagePage;
use crate::domain::errors::GalleryError;

/// Port for the paginated image listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GalleryPort: Send + Sync {
    /// Fetches the page that follows `last_key`, or the newest page when
    /// `last_key` is `None`.
    async fn fetch_page(&self, last_key: Option<String>) -> Result<ImagePage, GalleryError>;
}
