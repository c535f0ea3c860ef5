//! Text shown alongside a photo in the viewer.

use chrono::NaiveDateTime;

use crate::domain::entities::CheckinMetadata;

/// Timestamp layout used by the check-in exporter.
pub const CHECKIN_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// British-style display layout, e.g. `03/05/2024, 18:22:10`.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Formats `"{style} - {abv}% ABV"`.
#[must_use]
pub fn style_line(meta: &CheckinMetadata) -> String {
    format!("{} - {}% ABV", meta.style, meta.abv)
}

/// Formats `"({rating}/5)"` using the raw rating text.
#[must_use]
pub fn rating_suffix(meta: &CheckinMetadata) -> String {
    format!("({}/5)", meta.rating)
}

/// Formats `"{brewery} ({brewery_country})"`.
#[must_use]
pub fn brewery_line(meta: &CheckinMetadata) -> String {
    format!("{} ({})", meta.brewery, meta.brewery_country)
}

/// Reformats the check-in date for display, keeping the raw text when it
/// cannot be parsed.
#[must_use]
pub fn display_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw.trim(), CHECKIN_DATE_FORMAT).map_or_else(
        |_| raw.to_string(),
        |date| date.format(DISPLAY_DATE_FORMAT).to_string(),
    )
}

/// Comma-joined venue, city, state and country; `None` for check-ins at home
/// or without any location.
#[must_use]
pub fn location_line(meta: &CheckinMetadata) -> Option<String> {
    if meta.is_at_home() {
        return None;
    }
    let parts = meta.location_parts();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Date followed by the location, as shown in the viewer footer.
#[must_use]
pub fn footer_line(meta: &CheckinMetadata) -> String {
    let date = display_date(&meta.date);
    match location_line(meta) {
        Some(location) => format!("{date} {location}"),
        None => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AT_HOME_VENUE;
    use test_case::test_case;

    fn meta() -> CheckinMetadata {
        CheckinMetadata {
            beer: "Heady Topper".to_string(),
            brewery: "The Alchemist".to_string(),
            brewery_country: "United States".to_string(),
            rating: "4.75".to_string(),
            venue: "Taproom".to_string(),
            city: "Stowe".to_string(),
            state: "VT".to_string(),
            country: String::new(),
            date: "2024-05-03 18:22:10".to_string(),
            style: "IPA - Imperial / Double".to_string(),
            abv: "8".to_string(),
            ..CheckinMetadata::default()
        }
    }

    #[test]
    fn test_text_lines() {
        let meta = meta();
        assert_eq!(style_line(&meta), "IPA - Imperial / Double - 8% ABV");
        assert_eq!(rating_suffix(&meta), "(4.75/5)");
        assert_eq!(brewery_line(&meta), "The Alchemist (United States)");
    }

    #[test_case("2024-05-03 18:22:10", "03/05/2024, 18:22:10" ; "exporter_format")]
    #[test_case("2023-12-31 00:00:00", "31/12/2023, 00:00:00" ; "midnight")]
    #[test_case("yesterday", "yesterday" ; "unparsable_is_kept")]
    #[test_case("", "" ; "empty")]
    fn test_display_date(raw: &str, expected: &str) {
        assert_eq!(display_date(raw), expected);
    }

    #[test]
    fn test_footer_with_location() {
        assert_eq!(footer_line(&meta()), "03/05/2024, 18:22:10 Taproom, Stowe, VT");
    }

    #[test]
    fn test_footer_at_home_hides_location() {
        let mut meta = meta();
        meta.venue = AT_HOME_VENUE.to_string();
        assert_eq!(location_line(&meta), None);
        assert_eq!(footer_line(&meta), "03/05/2024, 18:22:10");
    }

    #[test]
    fn test_no_location_parts() {
        let meta = CheckinMetadata::default();
        assert_eq!(location_line(&meta), None);
    }
}
