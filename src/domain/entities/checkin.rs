//! Gallery image and check-in metadata entities.

/// Venue name used for check-ins logged without a physical location.
pub const AT_HOME_VENUE: &str = "Untappd at Home";

/// Metadata attached to each photo by the check-in exporter.
///
/// Every field is free-form text as delivered by the listing endpoint;
/// missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct CheckinMetadata {
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

impl CheckinMetadata {
    /// Parses the rating text, e.g. `"4.25"`.
    #[must_use]
    pub fn rating_value(&self) -> Option<f32> {
        self.rating.trim().parse::<f32>().ok().filter(|r| r.is_finite())
    }

    /// Returns venue, city, state and country with empty parts dropped.
    #[must_use]
    pub fn location_parts(&self) -> Vec<&str> {
        [
            self.venue.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect()
    }

    /// Returns true if the check-in was logged at home.
    #[must_use]
    pub fn is_at_home(&self) -> bool {
        self.venue == AT_HOME_VENUE
    }

    /// Returns true if the drinker left a comment.
    #[must_use]
    pub fn has_comment(&self) -> bool {
        !self.comment.trim().is_empty()
    }
}

/// One photo in the remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    url: String,
    key: String,
    metadata: CheckinMetadata,
}

impl GalleryImage {
    /// Creates a new gallery image.
    #[must_use]
    pub fn new(url: impl Into<String>, key: impl Into<String>, metadata: CheckinMetadata) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            metadata,
        }
    }

    /// Public URL of the full-resolution photo.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Storage key; unique within the listing and used as the page cursor.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Check-in metadata.
    #[must_use]
    pub const fn metadata(&self) -> &CheckinMetadata {
        &self.metadata
    }

    /// Short caption for grid cards.
    #[must_use]
    pub fn caption(&self) -> &str {
        if self.metadata.beer.is_empty() {
            &self.key
        } else {
            &self.metadata.beer
        }
    }
}

/// A single page of the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePage {
    /// Images in display order.
    pub images: Vec<GalleryImage>,
    /// Whether the server has older images after this page.
    pub has_more: bool,
}

impl ImagePage {
    /// Creates a page.
    #[must_use]
    pub const fn new(images: Vec<GalleryImage>, has_more: bool) -> Self {
        Self { images, has_more }
    }

    /// Key of the last image, which becomes the next cursor.
    #[must_use]
    pub fn last_key(&self) -> Option<&str> {
        self.images.last().map(GalleryImage::key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn metadata() -> CheckinMetadata {
        CheckinMetadata {
            beer: "Pliny the Elder".to_string(),
            venue: "The Bar".to_string(),
            city: "Santa Rosa".to_string(),
            state: String::new(),
            country: "United States".to_string(),
            rating: "4.5".to_string(),
            ..CheckinMetadata::default()
        }
    }

    #[test_case("4.25", Some(4.25) ; "decimal")]
    #[test_case(" 3 ", Some(3.0) ; "padded_integer")]
    #[test_case("", None ; "empty")]
    #[test_case("great", None ; "not_a_number")]
    #[test_case("NaN", None ; "nan")]
    fn test_rating_value(raw: &str, expected: Option<f32>) {
        let meta = CheckinMetadata {
            rating: raw.to_string(),
            ..CheckinMetadata::default()
        };
        assert_eq!(meta.rating_value(), expected);
    }

    #[test]
    fn test_location_parts_skip_empty() {
        assert_eq!(
            metadata().location_parts(),
            vec!["The Bar", "Santa Rosa", "United States"]
        );
    }

    #[test]
    fn test_at_home() {
        let mut meta = metadata();
        assert!(!meta.is_at_home());
        meta.venue = AT_HOME_VENUE.to_string();
        assert!(meta.is_at_home());
    }

    #[test]
    fn test_caption_falls_back_to_key() {
        let image = GalleryImage::new("u", "2024/05/a.jpg", CheckinMetadata::default());
        assert_eq!(image.caption(), "2024/05/a.jpg");

        let image = GalleryImage::new("u", "k", metadata());
        assert_eq!(image.caption(), "Pliny the Elder");
    }

    #[test]
    fn test_page_last_key() {
        let page = ImagePage::new(
            vec![
                GalleryImage::new("u1", "2024/05/b.jpg", CheckinMetadata::default()),
                GalleryImage::new("u2", "2024/05/a.jpg", CheckinMetadata::default()),
            ],
            true,
        );
        assert_eq!(page.last_key(), Some("2024/05/a.jpg"));
        assert_eq!(ImagePage::default().last_key(), None);
    }
}
