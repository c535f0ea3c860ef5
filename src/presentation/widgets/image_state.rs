//! Per-card image state and terminal graphics protocols.

use std::sync::Arc;

use ratatui_image::picker::{Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;

use crate::domain::entities::{GalleryImage, ImageStatus, ImageVariant};
use crate::infrastructure::image::{ImageLoadedEvent, ImageRequest};

/// Cards above and below the visible range whose thumbnails are loaded.
pub const LOAD_BUFFER: usize = 8;

/// Cards kept decoded in memory beyond the load buffer.
const MEMORY_BUFFER: usize = LOAD_BUFFER * 3;

/// Image shown by one card or by the viewer.
pub struct CardImage {
    pub url: String,
    pub image: Option<Arc<image::DynamicImage>>,
    pub protocol: Option<StatefulProtocol>,
    pub status: ImageStatus,
}

impl CardImage {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            image: None,
            protocol: None,
            status: ImageStatus::NotStarted,
        }
    }

    pub fn set_loaded(&mut self, image: Arc<image::DynamicImage>) {
        self.image = Some(image);
        self.status = ImageStatus::Ready;
        self.protocol = None;
    }

    pub fn set_downloading(&mut self) {
        self.status = ImageStatus::Downloading;
    }

    pub fn set_failed(&mut self, error: String) {
        self.status = ImageStatus::Failed(error);
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.image.is_some() && self.status.is_ready()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    #[must_use]
    pub const fn needs_load(&self) -> bool {
        self.status.is_not_started()
    }

    pub fn update_protocol_if_needed(&mut self, picker: &Picker) {
        if self.protocol.is_some() {
            return;
        }

        if let Some(ref image) = self.image {
            self.protocol = Some(picker.new_resize_protocol((**image).clone()));
        }
    }

    /// Drops the encoded protocol and, optionally, the decoded pixels.
    pub fn release(&mut self, pixels: bool) {
        self.protocol = None;
        if pixels && self.image.take().is_some() && self.status.is_ready() {
            self.status = ImageStatus::NotStarted;
        }
    }

    fn apply(&mut self, result: &Result<crate::domain::entities::LoadedImage, String>) {
        match result {
            Ok(loaded) => self.set_loaded(loaded.image.clone()),
            Err(e) => self.set_failed(e.clone()),
        }
    }
}

impl std::fmt::Debug for CardImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardImage")
            .field("url", &self.url)
            .field("has_image", &self.image.is_some())
            .field("has_protocol", &self.protocol.is_some())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Owns the graphics protocol picker, one [`CardImage`] per feed entry, and
/// the full-size image of the open viewer.
pub struct ThumbnailManager {
    picker: Picker,
    cards: Vec<CardImage>,
    viewer: Option<CardImage>,
    abandoned: Vec<ImageRequest>,
}

impl ThumbnailManager {
    /// Queries the terminal for its graphics support, falling back to
    /// half-block characters.
    #[must_use]
    pub fn new() -> Self {
        let mut picker = Picker::from_query_stdio().unwrap_or_else(|_| Picker::halfblocks());

        let caps = picker.capabilities();
        let has_sixel = caps
            .iter()
            .any(|c| matches!(c, ratatui_image::picker::Capability::Sixel));
        let has_kitty = caps
            .iter()
            .any(|c| matches!(c, ratatui_image::picker::Capability::Kitty));

        if has_sixel && !has_kitty && picker.protocol_type() == ProtocolType::Halfblocks {
            picker.set_protocol_type(ProtocolType::Sixel);
        }

        tracing::info!(protocol = ?picker.protocol_type(), "Image protocol selected");

        Self::with_picker(picker)
    }

    #[must_use]
    pub fn halfblocks() -> Self {
        Self::with_picker(Picker::halfblocks())
    }

    fn with_picker(picker: Picker) -> Self {
        Self {
            picker,
            cards: Vec::new(),
            viewer: None,
            abandoned: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Brings the cards in line with the feed. New images are appended; a
    /// feed that no longer starts with the same images rebuilds everything.
    pub fn sync(&mut self, images: &[GalleryImage]) {
        let prefix_matches = self.cards.len() <= images.len()
            && self
                .cards
                .iter()
                .zip(images)
                .all(|(card, image)| card.url == image.url());

        if !prefix_matches {
            self.cards.clear();
        }

        let start = self.cards.len();
        self.cards
            .extend(images[start..].iter().map(|image| CardImage::new(image.url())));
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.viewer = None;
    }

    #[must_use]
    pub fn card(&self, index: usize) -> Option<&CardImage> {
        self.cards.get(index)
    }

    /// Returns the card with its protocol prepared for rendering.
    pub fn card_for_render(&mut self, index: usize) -> Option<&mut CardImage> {
        let card = self.cards.get_mut(index)?;
        card.update_protocol_if_needed(&self.picker);
        Some(card)
    }

    /// Points the viewer at `url`, reusing the current state if unchanged.
    pub fn set_viewer(&mut self, url: Option<&str>) {
        if url.is_some() && self.viewer.as_ref().map(|v| v.url.as_str()) == url {
            return;
        }
        if let Some(previous) = self.viewer.take()
            && previous.is_loading()
        {
            self.abandoned.push(ImageRequest::full(previous.url));
        }
        self.viewer = url.map(CardImage::new);
    }

    /// Full-size loads started for images the viewer has moved away from.
    pub fn take_abandoned_loads(&mut self) -> Vec<ImageRequest> {
        std::mem::take(&mut self.abandoned)
    }

    #[must_use]
    pub fn viewer(&self) -> Option<&CardImage> {
        self.viewer.as_ref()
    }

    /// Returns the best image for the viewer: the full image when ready,
    /// otherwise the card's thumbnail.
    pub fn viewer_for_render(&mut self, index: Option<usize>) -> Option<&mut CardImage> {
        if self.viewer.as_ref().is_some_and(CardImage::is_ready) {
            let viewer = self.viewer.as_mut()?;
            viewer.update_protocol_if_needed(&self.picker);
            return Some(viewer);
        }
        let card = self.cards.get_mut(index?)?;
        if !card.is_ready() {
            return None;
        }
        card.update_protocol_if_needed(&self.picker);
        Some(card)
    }

    /// Returns the thumbnails needed around the visible range plus the viewer
    /// image, marking them as downloading.
    pub fn take_needed_loads(&mut self, visible_start: usize, visible_end: usize) -> Vec<ImageRequest> {
        let indices = Self::collect_needed_loads(&self.cards, visible_start, visible_end);
        let mut requests: Vec<ImageRequest> = indices
            .into_iter()
            .map(|index| {
                let card = &mut self.cards[index];
                card.set_downloading();
                ImageRequest::thumbnail(card.url.clone())
            })
            .collect();

        if let Some(viewer) = self.viewer.as_mut()
            && viewer.needs_load()
        {
            viewer.set_downloading();
            requests.push(ImageRequest::full(viewer.url.clone()));
        }

        requests
    }

    /// Indices of cards in the load window that have not started loading.
    #[must_use]
    pub fn collect_needed_loads(
        cards: &[CardImage],
        visible_start: usize,
        visible_end: usize,
    ) -> Vec<usize> {
        let buffer_start = visible_start.saturating_sub(LOAD_BUFFER);
        let buffer_end = visible_end + LOAD_BUFFER;

        cards
            .iter()
            .enumerate()
            .filter(|(idx, card)| *idx >= buffer_start && *idx <= buffer_end && card.needs_load())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Frees protocols outside the load window and pixels further away.
    pub fn clear_distant(&mut self, visible_start: usize, visible_end: usize) {
        let buffer_start = visible_start.saturating_sub(LOAD_BUFFER);
        let buffer_end = visible_end + LOAD_BUFFER;
        let memory_start = visible_start.saturating_sub(MEMORY_BUFFER);
        let memory_end = visible_end + MEMORY_BUFFER;

        for (idx, card) in self.cards.iter_mut().enumerate() {
            if idx < memory_start || idx > memory_end {
                card.release(true);
            } else if idx < buffer_start || idx > buffer_end {
                card.release(false);
            }
        }
    }

    /// Stores a finished load. Results for cards that no longer exist are
    /// ignored.
    pub fn on_loaded(&mut self, event: &ImageLoadedEvent) {
        match event.variant {
            ImageVariant::Thumbnail => {
                for card in self.cards.iter_mut().filter(|c| c.url == event.url) {
                    card.apply(&event.result);
                }
            }
            ImageVariant::Full => {
                if let Some(viewer) = self.viewer.as_mut().filter(|v| v.url == event.url) {
                    viewer.apply(&event.result);
                }
            }
        }
    }

    /// Forgets encoded protocols, e.g. after the terminal was resized.
    pub fn reset_protocols(&mut self) {
        for card in &mut self.cards {
            card.protocol = None;
        }
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.protocol = None;
        }
    }
}

impl Default for ThumbnailManager {
    fn default() -> Self {
        Self::new()
    }
}
