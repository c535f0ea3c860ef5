//! A single grid tile.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget},
};
use ratatui_image::{Resize, StatefulImage};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::image_state::CardImage;
use crate::domain::entities::{GalleryImage, ImageStatus};

pub struct ImageCardStyle {
    pub border: Style,
    pub selected_border: Style,
    pub caption: Style,
    pub placeholder: Style,
    pub error: Style,
}

impl Default for ImageCardStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            selected_border: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            caption: Style::default().fg(Color::Gray),
            placeholder: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
        }
    }
}

/// A bordered tile showing a thumbnail, or a placeholder until it is ready.
pub struct ImageCard<'a> {
    image: &'a GalleryImage,
    thumbnail: Option<&'a mut CardImage>,
    selected: bool,
    show_caption: bool,
    style: ImageCardStyle,
}

impl<'a> ImageCard<'a> {
    #[must_use]
    pub fn new(image: &'a GalleryImage, thumbnail: Option<&'a mut CardImage>) -> Self {
        Self {
            image,
            thumbnail,
            selected: false,
            show_caption: true,
            style: ImageCardStyle::default(),
        }
    }

    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    #[must_use]
    pub const fn show_caption(mut self, show: bool) -> Self {
        self.show_caption = show;
        self
    }

    #[must_use]
    pub const fn style(mut self, style: ImageCardStyle) -> Self {
        self.style = style;
        self
    }
}

impl Widget for ImageCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.selected {
            self.style.selected_border
        } else {
            self.style.border
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if self.selected {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.is_empty() {
            return;
        }

        let (image_area, caption_area) = if self.show_caption && inner.height > 1 {
            let [image_area, caption_area] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
            (image_area, Some(caption_area))
        } else {
            (inner, None)
        };

        match self.thumbnail {
            Some(card) if card.protocol.is_some() => {
                if let Some(protocol) = card.protocol.as_mut() {
                    StatefulImage::default()
                        .resize(Resize::Fit(None))
                        .render(image_area, buf, protocol);
                }
            }
            Some(card) => render_placeholder(&card.status, image_area, buf, &self.style),
            None => render_placeholder(&ImageStatus::NotStarted, image_area, buf, &self.style),
        }

        if let Some(caption_area) = caption_area {
            let caption = truncate(self.image.caption(), usize::from(caption_area.width));
            Paragraph::new(Line::from(caption))
                .style(self.style.caption)
                .alignment(Alignment::Center)
                .render(caption_area, buf);
        }
    }
}

fn render_placeholder(status: &ImageStatus, area: Rect, buf: &mut Buffer, style: &ImageCardStyle) {
    let (text, style) = match status {
        ImageStatus::Failed(_) => ("✕", style.error),
        _ => ("…", style.placeholder),
    };
    let y = area.y + area.height / 2;
    Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .render(Rect::new(area.x, y, area.width, 1), buf);
}

/// Cuts `text` to `width` columns, ending with an ellipsis when shortened.
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CheckinMetadata;
    use test_case::test_case;

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test_case("Pliny the Elder", 20, "Pliny the Elder" ; "fits")]
    #[test_case("Pliny the Elder", 8, "Pliny t…" ; "cut")]
    #[test_case("Pliny", 0, "" ; "zero_width")]
    #[test_case("ビール", 4, "ビ…" ; "wide_chars")]
    fn test_truncate(text: &str, width: usize, expected: &str) {
        assert_eq!(truncate(text, width), expected);
    }

    #[test]
    fn test_placeholder_and_caption() {
        let mut meta = CheckinMetadata::default();
        meta.beer = "Zombie Dust".to_string();
        let image = GalleryImage::new("https://img/1.jpg", "1.jpg", meta);
        let mut card = CardImage::new("https://img/1.jpg");
        let area = Rect::new(0, 0, 15, 6);
        let mut buf = Buffer::empty(area);

        ImageCard::new(&image, Some(&mut card)).render(area, &mut buf);

        assert!(row(&buf, 2).contains('…'));
        assert!(row(&buf, 4).contains("Zombie Dust"));
    }

    #[test]
    fn test_failed_card_shows_cross() {
        let image = GalleryImage::new("https://img/1.jpg", "1.jpg", CheckinMetadata::default());
        let mut card = CardImage::new("https://img/1.jpg");
        card.set_failed("HTTP 404".to_string());
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);

        ImageCard::new(&image, Some(&mut card))
            .show_caption(false)
            .render(area, &mut buf);

        assert!(row(&buf, 2).contains('✕'));
    }
}
