//! HTTP client for the paginated image listing.

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::dto::ImageResponse;
use crate::domain::entities::ImagePage;
use crate::domain::errors::GalleryError;
use crate::domain::ports::GalleryPort;

const IMAGES_PATH: &str = "api/images";
const LAST_KEY_PARAM: &str = "lastKey";
const USER_AGENT: &str = concat!("beer-gallery/", env!("CARGO_PKG_VERSION"));

/// Listing API client.
pub struct GalleryClient {
    client: Client,
    endpoint: Url,
}

impl GalleryClient {
    /// Creates client for the service at `base_url`.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or HTTP client creation fails.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, GalleryError> {
        let endpoint = Self::endpoint_for(base_url)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GalleryError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    fn endpoint_for(base_url: &str) -> Result<Url, GalleryError> {
        let base = base_url.trim().trim_end_matches('/');
        Url::parse(&format!("{base}/{IMAGES_PATH}"))
            .map_err(|e| GalleryError::invalid_url(format!("{base_url}: {e}")))
    }

    /// URL of the page following `last_key`.
    #[must_use]
    pub fn page_url(&self, last_key: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(key) = last_key.filter(|key| !key.is_empty()) {
            url.query_pairs_mut().append_pair(LAST_KEY_PARAM, key);
        }
        url
    }

    fn map_transport_error(e: &reqwest::Error) -> GalleryError {
        if e.is_timeout() {
            GalleryError::network("request timed out")
        } else if e.is_connect() {
            GalleryError::network("failed to connect to gallery service")
        } else {
            GalleryError::network(e.to_string())
        }
    }
}

#[async_trait]
impl GalleryPort for GalleryClient {
    async fn fetch_page(&self, last_key: Option<String>) -> Result<ImagePage, GalleryError> {
        let url = self.page_url(last_key.as_deref());

        debug!(url = %url, "Fetching image page");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Failed to reach gallery service");
            Self::map_transport_error(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Gallery service returned an error");
            return Err(GalleryError::http(status.as_u16()));
        }

        let body: ImageResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse image page");
            if e.is_decode() {
                GalleryError::decode(e.to_string())
            } else {
                Self::map_transport_error(&e)
            }
        })?;

        debug!(
            count = body.images.len(),
            has_more = body.has_more,
            "Image page received"
        );

        Ok(body.into())
    }
}
