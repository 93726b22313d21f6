//! Calendar helpers for the inspection extract.
//!
//! Dates in the extract are written day-first (`31/12/2025`). Everything here
//! works on [`NaiveDate`]: inspection dates carry no time-of-day or timezone.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Date-only layouts accepted by [`parse_day_first`], tried in order.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Two-digit-year fallbacks (`05/01/25`).
const SHORT_YEAR_FORMATS: &[&str] = &["%d/%m/%y", "%d-%m-%y"];

/// Date-time layouts; the time part is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a day-first date string.
///
/// Returns `None` for blank or unrecognised input; never guesses a date.
///
/// ```
/// use chrono::NaiveDate;
/// use visa_core::time_utils::parse_day_first;
///
/// assert_eq!(parse_day_first("05/01/2025"), NaiveDate::from_ymd_opt(2025, 1, 5));
/// assert_eq!(parse_day_first("31/12/2025"), NaiveDate::from_ymd_opt(2025, 12, 31));
/// assert_eq!(parse_day_first("12/31/2025"), None);
/// assert_eq!(parse_day_first(""), None);
/// ```
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            // `%Y` happily reads "25" as year 25; leave that to the short forms.
            if date.year() >= 1000 {
                return Some(date);
            }
        }
    }

    for fmt in SHORT_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .filter(|d| d.year() >= 1000)
}

/// Canonical year-month bucket key, e.g. `"2025-01"`.
pub fn year_month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Human-readable month label, e.g. `"Jan/2025"`.
pub fn month_year_label(date: NaiveDate) -> String {
    date.format("%b/%Y").to_string()
}

/// Render a date the way the extract writes it (`dd/mm/yyyy`).
pub fn format_day_first(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Split a `"YYYY-MM"` key back into `(year, month)`.
///
/// Used to order month buckets by the date they represent.
pub fn parse_year_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day_first_slash() {
        assert_eq!(parse_day_first("05/01/2025"), Some(ymd(2025, 1, 5)));
        assert_eq!(parse_day_first(" 10/01/2025 "), Some(ymd(2025, 1, 10)));
    }

    #[test]
    fn test_parse_day_first_never_month_first() {
        // 13th month does not exist; must not be swapped into a valid date.
        assert_eq!(parse_day_first("01/13/2025"), None);
        // Ambiguous input is read day-first.
        assert_eq!(parse_day_first("02/03/2025"), Some(ymd(2025, 3, 2)));
    }

    #[test]
    fn test_parse_day_first_short_year() {
        assert_eq!(parse_day_first("05/01/25"), Some(ymd(2025, 1, 5)));
    }

    #[test]
    fn test_parse_day_first_iso_and_datetime() {
        assert_eq!(parse_day_first("2025-01-05"), Some(ymd(2025, 1, 5)));
        assert_eq!(
            parse_day_first("05/01/2025 14:30:00"),
            Some(ymd(2025, 1, 5))
        );
    }

    #[test]
    fn test_parse_day_first_garbage() {
        assert_eq!(parse_day_first("ontem"), None);
        assert_eq!(parse_day_first("   "), None);
        assert_eq!(parse_day_first("32/01/2025"), None);
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let d = ymd(2024, 12, 31);
        assert_eq!(parse_day_first(&format_day_first(d)), Some(d));
    }

    #[test]
    fn test_month_keys_and_labels() {
        let d = ymd(2025, 1, 5);
        assert_eq!(year_month_key(d), "2025-01");
        assert_eq!(month_year_label(d), "Jan/2025");
        assert_eq!(month_year_label(ymd(2024, 12, 1)), "Dec/2024");
    }

    #[test]
    fn test_parse_year_month_key() {
        assert_eq!(parse_year_month_key("2025-01"), Some((2025, 1)));
        assert_eq!(parse_year_month_key("2025-13"), None);
        assert_eq!(parse_year_month_key("Jan/2025"), None);
    }
}
