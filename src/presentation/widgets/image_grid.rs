//! Responsive grid of image cards.

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget, Wrap},
};

use super::image_card::ImageCard;
use super::image_state::ThumbnailManager;
use crate::application::services::{ImageFeed, ScrollMetrics};

/// Narrowest card the grid will lay out.
pub const MIN_CARD_WIDTH: u16 = 12;

/// Smallest tile height, border and caption included.
const MIN_CARD_HEIGHT: u16 = 5;

/// Column and row geometry of the grid for a given width.
///
/// Terminal cells are roughly twice as tall as they are wide, so a square
/// image needs half as many rows as columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    columns: usize,
    card_width: u16,
    card_height: u16,
}

impl GridLayout {
    /// Fits as many columns of at least `min_card_width` as `width` allows,
    /// sharing leftover columns between the cards.
    #[must_use]
    pub fn compute(width: u16, min_card_width: u16, show_captions: bool) -> Self {
        let min_card_width = min_card_width.max(MIN_CARD_WIDTH);
        let columns = (width / min_card_width).max(1);
        let card_width = (width / columns).max(1);
        let card_height = (card_width / 2 + u16::from(show_captions)).max(MIN_CARD_HEIGHT);
        Self {
            columns: usize::from(columns),
            card_width,
            card_height,
        }
    }

    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub const fn card_width(&self) -> u16 {
        self.card_width
    }

    #[must_use]
    pub const fn card_height(&self) -> u16 {
        self.card_height
    }

    /// Number of rows needed for `tiles` tiles.
    #[must_use]
    pub const fn rows(&self, tiles: usize) -> usize {
        tiles.div_ceil(self.columns)
    }

    #[must_use]
    pub const fn row_of(&self, index: usize) -> usize {
        index / self.columns
    }

    /// Rows that fit entirely in `height` lines, at least one.
    #[must_use]
    pub fn visible_rows(&self, height: u16) -> usize {
        usize::from(height / self.card_height).max(1)
    }

    /// Tile indices shown when the grid starts at `scroll_row`, partially
    /// visible last row included.
    #[must_use]
    pub fn visible_range(&self, scroll_row: usize, height: u16, tiles: usize) -> Range<usize> {
        let rows = usize::from(height.div_ceil(self.card_height));
        let start = (scroll_row * self.columns).min(tiles);
        let end = ((scroll_row + rows) * self.columns).min(tiles);
        start..end
    }

    /// Scroll position in lines, for the feed's near-bottom check.
    #[must_use]
    pub fn metrics(&self, scroll_row: usize, height: u16, tiles: usize) -> ScrollMetrics {
        let row_height = u32::from(self.card_height);
        let rows = u32::try_from(self.rows(tiles)).unwrap_or(u32::MAX);
        let scroll = u32::try_from(scroll_row).unwrap_or(u32::MAX);
        ScrollMetrics {
            viewport_height: u32::from(height),
            content_height: rows.saturating_mul(row_height),
            scroll_offset: scroll.saturating_mul(row_height),
        }
    }

    /// Screen area of the tile at `index`, if it is on screen.
    #[must_use]
    pub fn tile_area(&self, area: Rect, scroll_row: usize, index: usize) -> Option<Rect> {
        let row = self.row_of(index).checked_sub(scroll_row)?;
        let column = u16::try_from(index % self.columns).ok()?;
        let y_offset = u16::try_from(row).ok()?.checked_mul(self.card_height)?;
        if y_offset >= area.height {
            return None;
        }
        let x = area.x + column * self.card_width;
        let y = area.y + y_offset;
        Some(Rect::new(x, y, self.card_width, self.card_height).intersection(area))
    }

    /// Tile index under a screen position.
    #[must_use]
    pub fn index_at(&self, area: Rect, scroll_row: usize, column: u16, row: u16) -> Option<usize> {
        if !area.contains((column, row).into()) {
            return None;
        }
        let col = usize::from((column - area.x) / self.card_width);
        if col >= self.columns {
            return None;
        }
        let grid_row = scroll_row + usize::from((row - area.y) / self.card_height);
        Some(grid_row * self.columns + col)
    }
}

/// Grid state kept between frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridViewState {
    pub selected: usize,
    pub scroll_row: usize,
}

/// Renders the feed as a grid of [`ImageCard`]s, plus a loading tile while
/// the next page is fetched.
pub struct ImageGrid<'a> {
    feed: &'a ImageFeed,
    layout: GridLayout,
    view: GridViewState,
    show_captions: bool,
}

impl<'a> ImageGrid<'a> {
    #[must_use]
    pub const fn new(feed: &'a ImageFeed, layout: GridLayout, view: GridViewState) -> Self {
        Self {
            feed,
            layout,
            view,
            show_captions: true,
        }
    }

    #[must_use]
    pub const fn show_captions(mut self, show: bool) -> Self {
        self.show_captions = show;
        self
    }

    /// Returns true if a "Loading..." tile follows the images.
    #[must_use]
    pub const fn shows_loading_tile(feed: &ImageFeed) -> bool {
        feed.is_loading() && feed.has_more()
    }

    /// Number of tiles, loading tile included.
    #[must_use]
    pub fn tile_count(feed: &ImageFeed) -> usize {
        feed.len() + usize::from(Self::shows_loading_tile(feed))
    }
}

impl StatefulWidget for ImageGrid<'_> {
    type State = ThumbnailManager;

    fn render(self, area: Rect, buf: &mut Buffer, thumbnails: &mut ThumbnailManager) {
        if area.is_empty() {
            return;
        }

        if self.feed.is_empty() && !Self::shows_loading_tile(self.feed) {
            render_empty_message(self.feed, area, buf);
            return;
        }

        let tiles = Self::tile_count(self.feed);
        let range = self
            .layout
            .visible_range(self.view.scroll_row, area.height, tiles);

        for index in range {
            let Some(tile) = self.layout.tile_area(area, self.view.scroll_row, index) else {
                continue;
            };

            match self.feed.get(index) {
                Some(image) => {
                    ImageCard::new(image, thumbnails.card_for_render(index))
                        .selected(index == self.view.selected)
                        .show_caption(self.show_captions)
                        .render(tile, buf);
                }
                None => render_loading_tile(tile, buf),
            }
        }
    }
}

fn render_loading_tile(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.is_empty() {
        return;
    }
    let y = inner.y + inner.height / 2;
    Paragraph::new("Loading...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .render(Rect::new(inner.x, y, inner.width, 1), buf);
}

fn render_empty_message(feed: &ImageFeed, area: Rect, buf: &mut Buffer) {
    let (text, style) = match feed.error() {
        Some(error) => (
            format!("Failed to load images: {error}\n\nPress r to retry"),
            Style::default().fg(Color::Red),
        ),
        None if feed.has_more() => ("Loading...".to_string(), Style::default().fg(Color::Cyan)),
        None => (
            "No images yet".to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    };
    let y = area.y + area.height / 3;
    Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(Rect::new(area.x, y, area.width, area.bottom() - y), buf);
}
