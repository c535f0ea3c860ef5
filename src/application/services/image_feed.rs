//! Paginated image feed state.
//!
//! The feed owns everything the grid knows about the remote listing: the
//! images fetched so far, the cursor for the next page, and whether a fetch
//! is in flight. Fetches themselves run elsewhere; the feed only hands out
//! [`PageRequest`]s and accepts their outcomes. Each request carries a
//! generation number so that results of cancelled requests are dropped.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::entities::{GalleryImage, ImagePage};

/// Lines from the end of the content at which the next page is requested.
pub const DEFAULT_LOAD_THRESHOLD: u16 = 12;

/// A page fetch handed out by [`ImageFeed::begin_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Generation the result must match to be applied.
    pub generation: u64,
    /// Cursor; `None` requests the newest page.
    pub last_key: Option<String>,
}

/// Scroll geometry of the view showing the feed, in terminal lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    /// Height of the visible area.
    pub viewport_height: u32,
    /// Height of all rendered content.
    pub content_height: u32,
    /// First visible line.
    pub scroll_offset: u32,
}

impl ScrollMetrics {
    /// Returns true if the viewport bottom is within `threshold` lines of the
    /// end of the content.
    #[must_use]
    pub const fn is_near_bottom(&self, threshold: u16) -> bool {
        self.viewport_height + self.scroll_offset + threshold as u32 >= self.content_height
    }

    /// Returns true if the content does not fill the viewport.
    #[must_use]
    pub const fn is_short(&self) -> bool {
        self.content_height <= self.viewport_height
    }
}

/// What applying a page changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was applied; `added` images were new.
    Applied {
        /// Number of images appended.
        added: usize,
    },
    /// The result belonged to a cancelled request.
    Stale,
}

/// Infinite-scroll feed over the paginated listing.
#[derive(Debug)]
pub struct ImageFeed {
    images: Vec<GalleryImage>,
    known_keys: HashSet<String>,
    is_loading: bool,
    has_more: bool,
    error: Option<String>,
    last_key: Option<String>,
    generation: u64,
    load_threshold: u16,
}

impl ImageFeed {
    /// Creates an empty feed that has not fetched anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_LOAD_THRESHOLD)
    }

    /// Creates an empty feed with a custom near-bottom threshold.
    #[must_use]
    pub fn with_threshold(load_threshold: u16) -> Self {
        Self {
            images: Vec::new(),
            known_keys: HashSet::new(),
            is_loading: false,
            has_more: true,
            error: None,
            last_key: None,
            generation: 0,
            load_threshold,
        }
    }

    #[must_use]
    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GalleryImage> {
        self.images.get(index)
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Index of the image with the given key.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.images.iter().position(|image| image.key() == key)
    }

    /// Starts a page fetch unless one is already running or the listing is
    /// exhausted.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.is_loading || !self.has_more {
            return None;
        }

        self.is_loading = true;
        self.error = None;

        debug!(
            generation = self.generation,
            last_key = ?self.last_key,
            "Requesting next page"
        );

        Some(PageRequest {
            generation: self.generation,
            last_key: self.last_key.clone(),
        })
    }

    /// Applies a fetched page.
    pub fn complete(&mut self, generation: u64, page: ImagePage) -> PageOutcome {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Dropping page from cancelled request"
            );
            return PageOutcome::Stale;
        }

        self.is_loading = false;

        if let Some(key) = page.last_key() {
            self.last_key = Some(key.to_string());
        } else if page.has_more {
            // The cursor cannot advance, so the same page would come back forever.
            warn!(last_key = ?self.last_key, "Empty page claims more results, stopping");
            self.has_more = false;
            return PageOutcome::Applied { added: 0 };
        }

        self.has_more = page.has_more;

        let received = page.images.len();
        let mut added = 0;
        for image in page.images {
            if self.known_keys.insert(image.key().to_string()) {
                self.images.push(image);
                added += 1;
            }
        }

        if added < received {
            debug!(duplicates = received - added, "Skipped duplicate images");
        }

        info!(
            added,
            total = self.images.len(),
            has_more = self.has_more,
            "Page loaded"
        );

        PageOutcome::Applied { added }
    }

    /// Records a failed fetch.
    ///
    /// Returns false if the failure belonged to a cancelled request.
    pub fn fail(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if generation != self.generation {
            return false;
        }

        let message = message.into();
        warn!(error = %message, "Page load failed");
        self.is_loading = false;
        self.error = Some(message);
        true
    }

    /// Abandons the in-flight fetch, if any.
    ///
    /// Returns true if a fetch was running.
    pub fn cancel(&mut self) -> bool {
        let was_loading = self.is_loading;
        self.generation += 1;
        self.is_loading = false;
        if was_loading {
            debug!(generation = self.generation, "Cancelled page load");
        }
        was_loading
    }

    /// Drops everything and starts over from the newest page.
    pub fn reset(&mut self) {
        self.cancel();
        self.images.clear();
        self.known_keys.clear();
        self.has_more = true;
        self.error = None;
        self.last_key = None;
        info!("Feed reset");
    }

    /// Clears a recorded error and requests the page that failed.
    pub fn retry(&mut self) -> Option<PageRequest> {
        self.error = None;
        self.begin_load()
    }

    /// Returns true if scrolling or an underfilled viewport should trigger a
    /// fetch. A recorded error suppresses automatic fetches until
    /// [`retry`](Self::retry).
    #[must_use]
    pub const fn should_load_more(&self, metrics: ScrollMetrics) -> bool {
        if self.is_loading || !self.has_more || self.error.is_some() {
            return false;
        }
        metrics.is_near_bottom(self.load_threshold) || metrics.is_short()
    }
}

impl Default for ImageFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CheckinMetadata;
    use test_case::test_case;

    fn image(key: &str) -> GalleryImage {
        GalleryImage::new(
            format!("https://img.example.com/{key}"),
            key,
            CheckinMetadata::default(),
        )
    }

    fn page(keys: &[&str], has_more: bool) -> ImagePage {
        ImagePage::new(keys.iter().map(|k| image(k)).collect(), has_more)
    }

    #[test]
    fn test_initial_state() {
        let feed = ImageFeed::new();
        assert!(feed.is_empty());
        assert!(!feed.is_loading());
        assert!(feed.has_more());
        assert!(feed.error().is_none());
        assert!(feed.last_key().is_none());
    }

    #[test]
    fn test_first_request_has_no_cursor() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().expect("first load");
        assert_eq!(request.last_key, None);
        assert!(feed.is_loading());
    }

    #[test]
    fn test_begin_load_is_guarded_while_loading() {
        let mut feed = ImageFeed::new();
        assert!(feed.begin_load().is_some());
        assert!(feed.begin_load().is_none());
    }

    #[test]
    fn test_cursor_follows_last_image() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.complete(request.generation, page(&["2024/05/b", "2024/05/a"], true));

        let next = feed.begin_load().unwrap();
        assert_eq!(next.last_key.as_deref(), Some("2024/05/a"));
    }

    #[test]
    fn test_exhausted_feed_stops_loading() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.complete(request.generation, page(&["a"], false));

        assert!(!feed.has_more());
        assert!(feed.begin_load().is_none());
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.complete(request.generation, page(&["c", "b"], true));

        let request = feed.begin_load().unwrap();
        let outcome = feed.complete(request.generation, page(&["b", "a"], true));

        assert_eq!(outcome, PageOutcome::Applied { added: 1 });
        let keys: Vec<_> = feed.images().iter().map(GalleryImage::key).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        assert!(feed.cancel());

        let outcome = feed.complete(request.generation, page(&["a"], true));
        assert_eq!(outcome, PageOutcome::Stale);
        assert!(feed.is_empty());
        assert!(!feed.fail(request.generation, "late failure"));
        assert!(feed.error().is_none());
    }

    #[test]
    fn test_failure_keeps_cursor_and_allows_retry() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.complete(request.generation, page(&["b"], true));

        let request = feed.begin_load().unwrap();
        assert!(feed.fail(request.generation, "HTTP error! status: 500"));
        assert_eq!(feed.error(), Some("HTTP error! status: 500"));
        assert!(!feed.is_loading());

        let retry = feed.retry().expect("retry allowed");
        assert_eq!(retry.last_key.as_deref(), Some("b"));
        assert!(feed.error().is_none());
    }

    #[test]
    fn test_empty_page_with_more_stops() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.complete(request.generation, page(&[], true));

        assert!(!feed.has_more());
        assert!(!feed.is_loading());
    }

    #[test]
    fn test_reset_starts_over() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.complete(request.generation, page(&["a"], false));

        feed.reset();
        assert!(feed.is_empty());
        assert!(feed.has_more());
        let request = feed.begin_load().unwrap();
        assert_eq!(request.last_key, None);
        assert_eq!(request.generation, 1);
    }

    #[test]
    fn test_position_by_key() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.complete(request.generation, page(&["c", "b", "a"], true));

        assert_eq!(feed.position("b"), Some(1));
        assert_eq!(feed.position("z"), None);
    }

    #[test_case(20, 100, 0, false ; "top_of_long_content")]
    #[test_case(20, 100, 70, true ; "within_threshold")]
    #[test_case(20, 100, 80, true ; "at_bottom")]
    #[test_case(20, 15, 0, true ; "short_content")]
    #[test_case(20, 20, 0, true ; "exactly_full")]
    fn test_should_load_more(viewport: u32, content: u32, offset: u32, expected: bool) {
        let feed = ImageFeed::new();
        let metrics = ScrollMetrics {
            viewport_height: viewport,
            content_height: content,
            scroll_offset: offset,
        };
        assert_eq!(feed.should_load_more(metrics), expected);
    }

    #[test]
    fn test_should_not_load_while_loading_or_after_error() {
        let mut feed = ImageFeed::new();
        let short = ScrollMetrics {
            viewport_height: 40,
            content_height: 0,
            scroll_offset: 0,
        };

        let request = feed.begin_load().unwrap();
        assert!(!feed.should_load_more(short));

        feed.fail(request.generation, "offline");
        assert!(!feed.should_load_more(short));

        feed.retry();
        assert!(!feed.should_load_more(short));
    }
}
