//! Star rating widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::domain::entities::StarRating;

pub const FULL_STAR: char = '★';
pub const PARTIAL_STAR: char = '⯪';
pub const EMPTY_STAR: char = '☆';

/// Draws a [`StarRating`] as full, partial and empty star glyphs.
#[derive(Debug, Clone)]
pub struct StarRatingWidget {
    rating: StarRating,
    suffix: Option<String>,
    filled_style: Style,
    empty_style: Style,
}

impl StarRatingWidget {
    #[must_use]
    pub fn new(rating: StarRating) -> Self {
        Self {
            rating,
            suffix: None,
            filled_style: Style::default().fg(Color::Yellow),
            empty_style: Style::default().fg(Color::DarkGray),
        }
    }

    /// Text shown after the stars, e.g. `(4.25/5)`.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    #[must_use]
    pub fn line(&self) -> Line<'static> {
        let full = usize::from(self.rating.full_stars());
        let mut spans = vec![Span::styled(
            FULL_STAR.to_string().repeat(full),
            self.filled_style,
        )];
        if self.rating.has_partial() {
            spans.push(Span::styled(PARTIAL_STAR.to_string(), self.filled_style));
        }
        spans.push(Span::styled(
            EMPTY_STAR
                .to_string()
                .repeat(usize::from(self.rating.empty_stars())),
            self.empty_style,
        ));
        if let Some(suffix) = &self.suffix {
            spans.push(Span::raw(format!(" {suffix}")));
        }
        Line::from(spans)
    }
}

impl Widget for StarRatingWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(4.0, "★★★★☆" ; "whole")]
    #[test_case(3.5, "★★★⯪☆" ; "half")]
    #[test_case(4.75, "★★★★⯪" ; "partial_last")]
    #[test_case(0.0, "☆☆☆☆☆" ; "zero")]
    #[test_case(7.0, "★★★★★" ; "clamped")]
    fn test_glyphs(rating: f32, expected: &str) {
        let line = StarRatingWidget::new(StarRating::new(rating)).line();
        let glyphs: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(glyphs, expected);
    }

    #[test]
    fn test_render_with_suffix() {
        let widget = StarRatingWidget::new(StarRating::new(2.0)).suffix("(2/5)");
        let area = Rect::new(0, 0, 11, 1);
        let mut buf = Buffer::empty(area);

        widget.render(area, &mut buf);

        let rendered: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert_eq!(rendered, "★★☆☆☆ (2/5)");
    }
}
