//! Star rating breakdown.

/// Default number of stars in a rating scale.
pub const DEFAULT_MAX_STARS: u8 = 5;

/// A rating split into full, partial and empty stars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarRating {
    rating: f32,
    max_stars: u8,
}

impl StarRating {
    /// Creates a rating on the default five-star scale.
    #[must_use]
    pub fn new(rating: f32) -> Self {
        Self::with_max(rating, DEFAULT_MAX_STARS)
    }

    /// Creates a rating on a custom scale. Out-of-range ratings are clamped.
    #[must_use]
    pub fn with_max(rating: f32, max_stars: u8) -> Self {
        let max = f32::from(max_stars);
        let rating = if rating.is_nan() {
            0.0
        } else {
            rating.clamp(0.0, max)
        };
        Self { rating, max_stars }
    }

    /// The clamped rating.
    #[must_use]
    pub const fn rating(&self) -> f32 {
        self.rating
    }

    /// Size of the scale.
    #[must_use]
    pub const fn max_stars(&self) -> u8 {
        self.max_stars
    }

    /// Number of completely filled stars.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn full_stars(&self) -> u8 {
        self.rating.floor() as u8
    }

    /// Fractional fill of the star after the full ones, in `[0, 1)`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.rating % 1.0
    }

    /// Returns true if a partially filled star is drawn.
    #[must_use]
    pub fn has_partial(&self) -> bool {
        self.fraction() > 0.0
    }

    /// Number of empty stars after the full and partial ones.
    #[must_use]
    pub fn empty_stars(&self) -> u8 {
        self.max_stars
            .saturating_sub(self.full_stars())
            .saturating_sub(u8::from(self.has_partial()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(4.0, 4, false, 1 ; "whole")]
    #[test_case(3.75, 3, true, 1 ; "three_quarters")]
    #[test_case(0.0, 0, false, 5 ; "zero")]
    #[test_case(5.0, 5, false, 0 ; "max")]
    #[test_case(0.25, 0, true, 4 ; "only_partial")]
    #[test_case(7.5, 5, false, 0 ; "clamped_high")]
    #[test_case(-2.0, 0, false, 5 ; "clamped_low")]
    fn test_breakdown(rating: f32, full: u8, partial: bool, empty: u8) {
        let stars = StarRating::new(rating);
        assert_eq!(stars.full_stars(), full);
        assert_eq!(stars.has_partial(), partial);
        assert_eq!(stars.empty_stars(), empty);
    }

    #[test]
    fn test_stars_always_fill_scale() {
        for tenths in 0..=50 {
            let stars = StarRating::new(tenths as f32 / 10.0);
            let total = stars.full_stars() + u8::from(stars.has_partial()) + stars.empty_stars();
            assert_eq!(total, DEFAULT_MAX_STARS);
        }
    }

    #[test]
    fn test_nan_is_zero() {
        let stars = StarRating::new(f32::NAN);
        assert_eq!(stars.rating(), 0.0);
        assert_eq!(stars.empty_stars(), 5);
    }

    #[test]
    fn test_fraction() {
        let stars = StarRating::new(3.5);
        assert!((stars.fraction() - 0.5).abs() < f32::EPSILON);
    }
}
