//! Full-screen viewer navigation over the feed.

use tracing::debug;

use super::image_feed::{ImageFeed, PageRequest};
use crate::domain::entities::GalleryImage;

/// Result of asking the viewer to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerMove {
    /// The viewer now shows the image at this index.
    Moved(usize),
    /// The viewer waits for the next page; fetch it with this request.
    AwaitingPage(PageRequest),
    /// Nothing to move to.
    Unchanged,
}

/// Tracks which image is open and whether it should advance once more
/// images arrive.
#[derive(Debug, Default)]
pub struct Viewer {
    selected_key: Option<String>,
    pending_advance: bool,
}

impl Viewer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the viewer on the image with `key`.
    pub fn open(&mut self, key: impl Into<String>) {
        let key = key.into();
        debug!(key = %key, "Viewer opened");
        self.selected_key = Some(key);
        self.pending_advance = false;
    }

    pub fn close(&mut self) {
        self.selected_key = None;
        self.pending_advance = false;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.selected_key.is_some()
    }

    #[must_use]
    pub fn selected_key(&self) -> Option<&str> {
        self.selected_key.as_deref()
    }

    #[must_use]
    pub const fn is_pending_advance(&self) -> bool {
        self.pending_advance
    }

    /// Index of the open image within the feed.
    #[must_use]
    pub fn current_index(&self, feed: &ImageFeed) -> Option<usize> {
        self.selected_key.as_deref().and_then(|key| feed.position(key))
    }

    /// The open image.
    #[must_use]
    pub fn current<'a>(&self, feed: &'a ImageFeed) -> Option<&'a GalleryImage> {
        self.current_index(feed).and_then(|index| feed.get(index))
    }

    #[must_use]
    pub fn show_previous(&self, feed: &ImageFeed) -> bool {
        self.current_index(feed).is_some_and(|index| index > 0)
    }

    #[must_use]
    pub fn show_next(&self, feed: &ImageFeed) -> bool {
        self.current_index(feed)
            .is_some_and(|index| feed.has_more() || index + 1 < feed.len())
    }

    /// Moves to the following image, fetching another page at the end of the
    /// loaded images.
    pub fn next(&mut self, feed: &mut ImageFeed) -> ViewerMove {
        let Some(index) = self.current_index(feed) else {
            return ViewerMove::Unchanged;
        };

        if index + 1 < feed.len() {
            return self.select(feed, index + 1);
        }

        if feed.has_more()
            && !feed.is_loading()
            && let Some(request) = feed.begin_load()
        {
            debug!("Viewer reached the end of loaded images, fetching more");
            self.pending_advance = true;
            return ViewerMove::AwaitingPage(request);
        }

        ViewerMove::Unchanged
    }

    /// Moves to the preceding image.
    pub fn previous(&mut self, feed: &ImageFeed) -> ViewerMove {
        match self.current_index(feed) {
            Some(index) if index > 0 => self.select(feed, index - 1),
            _ => ViewerMove::Unchanged,
        }
    }

    /// Completes a pending advance after the feed changed. A page that added
    /// nothing new leaves the viewer at the end, so the following page is
    /// requested.
    pub fn on_feed_changed(&mut self, feed: &mut ImageFeed) -> ViewerMove {
        if !self.pending_advance || feed.is_loading() {
            return ViewerMove::Unchanged;
        }

        let Some(index) = self.current_index(feed) else {
            self.pending_advance = false;
            return ViewerMove::Unchanged;
        };

        if index + 1 < feed.len() {
            self.pending_advance = false;
            return self.select(feed, index + 1);
        }

        if !feed.has_more() || feed.error().is_some() {
            self.pending_advance = false;
            return ViewerMove::Unchanged;
        }

        match feed.begin_load() {
            Some(request) => {
                debug!(last_key = ?request.last_key, "Page added no new images, fetching more");
                ViewerMove::AwaitingPage(request)
            }
            None => {
                self.pending_advance = false;
                ViewerMove::Unchanged
            }
        }
    }

    fn select(&mut self, feed: &ImageFeed, index: usize) -> ViewerMove {
        match feed.get(index) {
            Some(image) => {
                self.selected_key = Some(image.key().to_string());
                ViewerMove::Moved(index)
            }
            None => ViewerMove::Unchanged,
        }
    }
}
