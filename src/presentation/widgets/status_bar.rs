//! Status bar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::application::services::ImageFeed;

/// Status bar severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Informational.
    Info,
    /// Success.
    Success,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

impl StatusLevel {
    /// Returns color for level.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Status bar widget.
#[derive(Debug, Clone)]
pub struct StatusBar {
    left: String,
    center: String,
    right: String,
    level: StatusLevel,
}

impl StatusBar {
    /// Creates empty status bar.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left: String::new(),
            center: String::new(),
            right: String::new(),
            level: StatusLevel::Info,
        }
    }

    /// Sets left content.
    #[must_use]
    pub fn left(mut self, content: impl Into<String>) -> Self {
        self.left = content.into();
        self
    }

    /// Sets center content.
    #[must_use]
    pub fn center(mut self, content: impl Into<String>) -> Self {
        self.center = content.into();
        self
    }

    /// Sets right content.
    #[must_use]
    pub fn right(mut self, content: impl Into<String>) -> Self {
        self.right = content.into();
        self
    }

    /// Sets status level.
    #[must_use]
    pub const fn level(mut self, level: StatusLevel) -> Self {
        self.level = level;
        self
    }

    /// Summarizes the feed: fetch progress or error on the left, position
    /// and count on the right.
    #[must_use]
    pub fn for_feed(title: &str, feed: &ImageFeed, selected: Option<usize>) -> Self {
        let count = if feed.has_more() {
            format!("{}+ images", feed.len())
        } else {
            format!("{} images", feed.len())
        };
        let right = match selected {
            Some(index) if index < feed.len() => format!("{} of {count}", index + 1),
            _ => count,
        };

        let bar = Self::new().center(title).right(right);
        if let Some(error) = feed.error() {
            bar.left(format!("Error: {error} (r to retry)"))
                .level(StatusLevel::Error)
        } else if feed.is_loading() {
            bar.left("Loading...").level(StatusLevel::Info)
        } else if !feed.has_more() && !feed.is_empty() {
            bar.left("All images loaded").level(StatusLevel::Success)
        } else {
            bar
        }
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.level.color())
            .add_modifier(Modifier::BOLD);

        let width = area.width as usize;

        let left_len = self.left.width();
        let center_len = self.center.width();
        let right_len = self.right.width();

        let center_start = width.saturating_sub(center_len) / 2;
        let right_start = width.saturating_sub(right_len);

        let mut spans = Vec::new();

        spans.push(Span::styled(&self.left, style));

        let left_padding = center_start.saturating_sub(left_len);
        if left_padding > 0 {
            spans.push(Span::raw(" ".repeat(left_padding)));
        }

        if !self.center.is_empty() {
            spans.push(Span::styled(&self.center, style));
        }

        let current_len = left_len + left_padding + center_len;
        let right_padding = right_start.saturating_sub(current_len);
        if right_padding > 0 {
            spans.push(Span::raw(" ".repeat(right_padding)));
        }

        if !self.right.is_empty() {
            spans.push(Span::styled(&self.right, style));
        }

        let line = Line::from(spans);
        let paragraph = Paragraph::new(line);
        paragraph.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CheckinMetadata, GalleryImage, ImagePage};

    fn page(count: usize, has_more: bool) -> ImagePage {
        ImagePage::new(
            (0..count)
                .map(|i| {
                    GalleryImage::new(
                        format!("https://img/{i}.jpg"),
                        format!("{i}.jpg"),
                        CheckinMetadata::default(),
                    )
                })
                .collect(),
            has_more,
        )
    }

    fn rendered(bar: &StatusBar, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        (0..width).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn test_loading_feed() {
        let mut feed = ImageFeed::new();
        feed.begin_load();

        let bar = StatusBar::for_feed("beer-gallery", &feed, None);

        assert_eq!(bar.level, StatusLevel::Info);
        assert_eq!(bar.left, "Loading...");
        assert_eq!(bar.right, "0+ images");
    }

    #[test]
    fn test_error_feed() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.fail(request.generation, "HTTP error! status: 500");

        let bar = StatusBar::for_feed("beer-gallery", &feed, None);

        assert_eq!(bar.level, StatusLevel::Error);
        assert_eq!(bar.left, "Error: HTTP error! status: 500 (r to retry)");
    }

    #[test]
    fn test_exhausted_feed_with_selection() {
        let mut feed = ImageFeed::new();
        let request = feed.begin_load().unwrap();
        feed.complete(request.generation, page(3, false));

        let bar = StatusBar::for_feed("beer-gallery", &feed, Some(1));

        assert_eq!(bar.level, StatusLevel::Success);
        assert_eq!(bar.right, "2 of 3 images");
    }

    #[test]
    fn test_render_places_sections() {
        let bar = StatusBar::new().left("L").center("C").right("R");
        assert_eq!(rendered(&bar, 9), "L   C   R");
    }
}
