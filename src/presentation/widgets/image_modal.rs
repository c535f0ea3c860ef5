//! Full-screen image viewer overlay.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, StatefulWidget, Widget, Wrap},
};
use ratatui_image::{Resize, StatefulImage};

use super::image_state::ThumbnailManager;
use super::star_rating::StarRatingWidget;
use crate::application::services::checkin_format;
use crate::domain::entities::{GalleryImage, ImageStatus, StarRating};

/// Widths below this stack the details under the image.
const SIDE_BY_SIDE_MIN_WIDTH: u16 = 70;

pub struct ImageModalStyle {
    pub border: Style,
    pub title: Style,
    pub subtitle: Style,
    pub comment: Style,
    pub footer: Style,
    pub hint: Style,
}

impl Default for ImageModalStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::Yellow),
            title: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            subtitle: Style::default().fg(Color::Gray),
            comment: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::ITALIC),
            footer: Style::default().fg(Color::DarkGray),
            hint: Style::default().fg(Color::Cyan),
        }
    }
}

/// Overlay showing one image with its check-in details and navigation hints.
pub struct ImageModal<'a> {
    image: &'a GalleryImage,
    index: Option<usize>,
    total: usize,
    show_previous: bool,
    show_next: bool,
    awaiting_more: bool,
    style: ImageModalStyle,
}

impl<'a> ImageModal<'a> {
    #[must_use]
    pub fn new(image: &'a GalleryImage, index: Option<usize>, total: usize) -> Self {
        Self {
            image,
            index,
            total,
            show_previous: false,
            show_next: false,
            awaiting_more: false,
            style: ImageModalStyle::default(),
        }
    }

    #[must_use]
    pub const fn navigation(mut self, show_previous: bool, show_next: bool) -> Self {
        self.show_previous = show_previous;
        self.show_next = show_next;
        self
    }

    /// Marks that the next image is being fetched.
    #[must_use]
    pub const fn awaiting_more(mut self, awaiting: bool) -> Self {
        self.awaiting_more = awaiting;
        self
    }

    /// Area the overlay covers within `screen`; clicks outside it close the
    /// viewer.
    #[must_use]
    pub fn area(screen: Rect) -> Rect {
        screen.inner(Margin::new(2, 1))
    }

    fn title(&self) -> String {
        match self.index {
            Some(index) => format!(" {} / {} ", index + 1, self.total),
            None => String::new(),
        }
    }

    fn details(&self) -> Vec<Line<'static>> {
        let meta = self.image.metadata();
        let mut lines = vec![
            Line::from(Span::styled(self.image.caption().to_string(), self.style.title)),
            Line::from(Span::styled(
                checkin_format::style_line(meta),
                self.style.subtitle,
            )),
            Line::from(Span::styled(
                checkin_format::brewery_line(meta),
                self.style.subtitle,
            )),
            Line::default(),
        ];

        match meta.rating_value() {
            Some(rating) => lines.push(
                StarRatingWidget::new(StarRating::new(rating))
                    .suffix(checkin_format::rating_suffix(meta))
                    .line(),
            ),
            None => lines.push(Line::from(Span::styled("No rating", self.style.footer))),
        }

        if meta.has_comment() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                meta.comment.clone(),
                self.style.comment,
            )));
        }

        lines
    }

    fn hints(&self) -> Line<'static> {
        let mut spans = Vec::new();
        if self.show_previous {
            spans.push(Span::styled("‹ h prev", self.style.hint));
        }
        if self.awaiting_more {
            if !spans.is_empty() {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled("loading more…", self.style.footer));
        } else if self.show_next {
            if !spans.is_empty() {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled("l next ›", self.style.hint));
        }
        Line::from(spans)
    }
}

impl StatefulWidget for ImageModal<'_> {
    type State = ThumbnailManager;

    fn render(self, area: Rect, buf: &mut Buffer, thumbnails: &mut ThumbnailManager) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.style.border)
            .title(Line::from(self.title()).alignment(Alignment::Left))
            .title(
                Line::from(Span::styled(" Esc close ", self.style.hint))
                    .alignment(Alignment::Right),
            )
            .title_bottom(self.hints().alignment(Alignment::Center));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.is_empty() {
            return;
        }

        let (image_area, details_area) = if inner.width >= SIDE_BY_SIDE_MIN_WIDTH {
            let [image_area, _, details_area] = Layout::horizontal([
                Constraint::Percentage(62),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(inner);
            (image_area, details_area)
        } else {
            let [image_area, details_area] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(8)]).areas(inner);
            (image_area, details_area)
        };

        match thumbnails.viewer_for_render(self.index) {
            Some(card) => {
                if let Some(protocol) = card.protocol.as_mut() {
                    StatefulImage::default()
                        .resize(Resize::Fit(None))
                        .render(image_area, buf, protocol);
                }
            }
            None => {
                let failed = thumbnails.viewer().and_then(|v| match &v.status {
                    ImageStatus::Failed(e) => Some(e.clone()),
                    _ => None,
                });
                let (text, style) = match failed {
                    Some(error) => (
                        format!("Could not load image: {error}"),
                        Style::default().fg(Color::Red),
                    ),
                    None => ("Loading...".to_string(), self.style.footer),
                };
                let y = image_area.y + image_area.height / 2;
                Paragraph::new(text)
                    .style(style)
                    .alignment(Alignment::Center)
                    .render(Rect::new(image_area.x, y, image_area.width, 1), buf);
            }
        }

        let [text_area, footer_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(2)]).areas(details_area);

        Paragraph::new(self.details())
            .wrap(Wrap { trim: false })
            .render(text_area, buf);

        Paragraph::new(checkin_format::footer_line(self.image.metadata()))
            .style(self.style.footer)
            .wrap(Wrap { trim: true })
            .render(footer_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CheckinMetadata;

    fn image() -> GalleryImage {
        GalleryImage::new(
            "https://img/1.jpg",
            "1.jpg",
            CheckinMetadata {
                beer: "Zombie Dust".to_string(),
                brewery: "3 Floyds".to_string(),
                brewery_country: "United States".to_string(),
                style: "Pale Ale - American".to_string(),
                abv: "6.2".to_string(),
                rating: "4.5".to_string(),
                comment: "Citra all the way".to_string(),
                date: "2024-05-03 18:22:10".to_string(),
                venue: "Untappd at Home".to_string(),
                ..CheckinMetadata::default()
            },
        )
    }

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.bottom())
            .map(|y| {
                (area.x..area.right())
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_area_leaves_a_margin() {
        assert_eq!(
            ImageModal::area(Rect::new(0, 0, 100, 40)),
            Rect::new(2, 1, 96, 38)
        );
    }

    #[test]
    fn test_renders_details_and_hints() {
        let image = image();
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);

        ImageModal::new(&image, Some(1), 10)
            .navigation(true, true)
            .render(area, &mut buf, &mut ThumbnailManager::halfblocks());

        let rendered = text(&buf);
        assert!(rendered.contains(" 2 / 10 "));
        assert!(rendered.contains("Zombie Dust"));
        assert!(rendered.contains("Pale Ale - American - 6.2% ABV"));
        assert!(rendered.contains("3 Floyds (United States)"));
        assert!(rendered.contains("★★★★⯪ (4.5/5)"));
        assert!(rendered.contains("Citra all the way"));
        assert!(rendered.contains("03/05/2024, 18:22:10"));
        assert!(!rendered.contains("Untappd at Home"));
        assert!(rendered.contains("‹ h prev"));
        assert!(rendered.contains("l next ›"));
        assert!(rendered.contains("Loading..."));
    }

    #[test]
    fn test_hides_unavailable_navigation() {
        let image = image();
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);

        ImageModal::new(&image, Some(0), 1)
            .navigation(false, false)
            .render(area, &mut buf, &mut ThumbnailManager::halfblocks());

        let rendered = text(&buf);
        assert!(!rendered.contains("prev"));
        assert!(!rendered.contains("next"));
    }

    #[test]
    fn test_awaiting_more_replaces_next_hint() {
        let image = image();
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);

        ImageModal::new(&image, Some(0), 1)
            .navigation(false, true)
            .awaiting_more(true)
            .render(area, &mut buf, &mut ThumbnailManager::halfblocks());

        let rendered = text(&buf);
        assert!(rendered.contains("loading more…"));
        assert!(!rendered.contains("l next ›"));
    }
}
