use serde::Deserialize;

use crate::domain::entities::{CheckinMetadata, GalleryImage, ImagePage};

/// Listing endpoint response structure.
#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    /// Images on this page.
    #[serde(default)]
    pub images: Vec<ImageDto>,
    /// Whether older images exist.
    #[serde(default)]
    pub has_more: bool,
}

/// One image in the listing.
#[derive(Debug, Deserialize)]
pub struct ImageDto {
    /// Public URL.
    pub url: String,
    /// Storage key.
    pub key: String,
    /// Check-in metadata; absent for photos uploaded without one.
    #[serde(default)]
    pub metadata: CheckinMetadataDto,
}

/// Check-in metadata as sent by the listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct CheckinMetadataDto {
    pub id: String,
    pub beer: String,
    pub brewery: String,
    pub brewery_country: String,
    pub comment: String,
    pub rating: String,
    pub venue: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat_lng: String,
    pub date: String,
    pub style: String,
    pub abv: String,
}

impl From<CheckinMetadataDto> for CheckinMetadata {
    fn from(dto: CheckinMetadataDto) -> Self {
        Self {
            id: dto.id,
            beer: dto.beer,
            brewery: dto.brewery,
            brewery_country: dto.brewery_country,
            comment: dto.comment,
            rating: dto.rating,
            venue: dto.venue,
            city: dto.city,
            state: dto.state,
            country: dto.country,
            lat_lng: dto.lat_lng,
            date: dto.date,
            style: dto.style,
            abv: dto.abv,
        }
    }
}

impl From<ImageDto> for GalleryImage {
    fn from(dto: ImageDto) -> Self {
        Self::new(dto.url, dto.key, dto.metadata.into())
    }
}

impl From<ImageResponse> for ImagePage {
    fn from(response: ImageResponse) -> Self {
        Self::new(
            response.images.into_iter().map(GalleryImage::from).collect(),
            response.has_more,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let json = r#"{
            "images": [{
                "url": "https://img.example.com/2024/05/a.jpg",
                "key": "2024/05/a.jpg",
                "last_modified": "2024-05-03T18:22:10Z",
                "etag": "\"abc\"",
                "size": 12345,
                "storage_class": "STANDARD",
                "metadata": {
                    "id": "1377",
                    "beer": "Focal Banger",
                    "brewery": "The Alchemist",
                    "rating": "4.5",
                    "date": "2024-05-03 18:22:10"
                }
            }],
            "has_more": true
        }"#;

        let response: ImageResponse = serde_json::from_str(json).unwrap();
        let page = ImagePage::from(response);

        assert!(page.has_more);
        assert_eq!(page.images.len(), 1);
        let image = &page.images[0];
        assert_eq!(image.key(), "2024/05/a.jpg");
        assert_eq!(image.metadata().beer, "Focal Banger");
        assert_eq!(image.metadata().venue, "");
        assert_eq!(image.metadata().rating_value(), Some(4.5));
    }

    #[test]
    fn test_parse_empty_response() {
        let response: ImageResponse =
            serde_json::from_str(r#"{"images": [], "has_more": false}"#).unwrap();
        let page = ImagePage::from(response);
        assert!(page.images.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let response: ImageResponse =
            serde_json::from_str(r#"{"images": [{"url": "u", "key": "k"}]}"#).unwrap();
        let page = ImagePage::from(response);
        assert_eq!(page.images[0].metadata(), &CheckinMetadata::default());
        assert!(!page.has_more);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let result = serde_json::from_str::<ImageResponse>(r#"{"images": [{"url": "u"}]}"#);
        assert!(result.is_err());
    }
}
