//! Posting-age derivation.
//!
//! Providers report posting dates as ISO timestamps, bare dates, or loose
//! "3 days ago" phrases. Everything reduces to an age in minutes; a string
//! nothing here recognizes has unknown age and is treated as infinitely
//! old — it sorts last and fails any max-age window.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

pub const MINUTES_PER_HOUR: i64 = 60;
pub const MINUTES_PER_DAY: i64 = 1440;
pub const MINUTES_PER_WEEK: i64 = 10080;

lazy_static! {
    static ref MINUTES_RE: Regex = Regex::new(r"(?i)\b(\d+)\s*min(?:ute)?s?\b").unwrap();
    static ref HOURS_RE: Regex = Regex::new(r"(?i)\b(\d+)\s*h(?:ou)?rs?\b").unwrap();
    static ref DAYS_RE: Regex = Regex::new(r"(?i)\b(\d+)\s*d(?:ay)?s?\b").unwrap();
    static ref WEEKS_RE: Regex = Regex::new(r"(?i)\b(\d+)\s*w(?:eek)?s?\b").unwrap();
}

/// Parse a relative "time ago" phrase to minutes. `None` means unrecognized.
pub fn parse_relative_age(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.to_lowercase().contains("just now") {
        return Some(0);
    }

    let scales: [(&Regex, i64); 4] = [
        (&MINUTES_RE, 1),
        (&HOURS_RE, MINUTES_PER_HOUR),
        (&DAYS_RE, MINUTES_PER_DAY),
        (&WEEKS_RE, MINUTES_PER_WEEK),
    ];
    for (pattern, scale) in scales {
        if let Some(captures) = pattern.captures(text) {
            let count: i64 = captures[1].parse().ok()?;
            return Some(count * scale);
        }
    }
    None
}

/// Age in minutes of a posting-date field: RFC 3339 timestamp, bare
/// `YYYY-MM-DD` date (taken as midnight UTC), or a relative phrase.
pub fn derive_age_minutes(posted: &str, now: DateTime<Utc>) -> Option<i64> {
    let posted = posted.trim();
    if posted.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(posted) {
        return Some((now - timestamp.with_timezone(&Utc)).num_minutes().max(0));
    }
    if let Ok(date) = NaiveDate::parse_from_str(posted, "%Y-%m-%d") {
        let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        return Some((now - midnight).num_minutes().max(0));
    }
    parse_relative_age(posted)
}

/// Max allowed age for a recency token; `None` for an unrecognized or empty
/// token (no window).
pub fn window_minutes(sort_token: &str) -> Option<i64> {
    match sort_token {
        "day" => Some(MINUTES_PER_DAY),
        "week" => Some(MINUTES_PER_WEEK),
        "month" => Some(30 * MINUTES_PER_DAY),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_age_table() {
        assert_eq!(parse_relative_age("just now"), Some(0));
        assert_eq!(parse_relative_age("Just Now"), Some(0));
        assert_eq!(parse_relative_age("5 minutes ago"), Some(5));
        assert_eq!(parse_relative_age("45 min"), Some(45));
        assert_eq!(parse_relative_age("2 hours ago"), Some(120));
        assert_eq!(parse_relative_age("1 hr"), Some(60));
        assert_eq!(parse_relative_age("3 days ago"), Some(4320));
        assert_eq!(parse_relative_age("1d"), Some(1440));
        assert_eq!(parse_relative_age("2 weeks"), Some(20160));
        assert_eq!(parse_relative_age("1 week ago"), Some(10080));
    }

    #[test]
    fn test_unrecognized_is_unknown() {
        assert_eq!(parse_relative_age(""), None);
        assert_eq!(parse_relative_age("recently"), None);
        assert_eq!(parse_relative_age("30+ days ago"), None);
    }

    #[test]
    fn test_derive_age_from_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            derive_age_minutes("2024-06-15T10:00:00Z", now),
            Some(120)
        );
        // Bare date: midnight UTC.
        assert_eq!(derive_age_minutes("2024-06-14", now), Some(2160));
        // A future timestamp clamps to zero rather than going negative.
        assert_eq!(derive_age_minutes("2024-06-15T13:00:00Z", now), Some(0));
        // Relative fallback.
        assert_eq!(derive_age_minutes("2 days ago", now), Some(2880));
        assert_eq!(derive_age_minutes("gibberish", now), None);
    }

    #[test]
    fn test_window_tokens() {
        assert_eq!(window_minutes("day"), Some(1440));
        assert_eq!(window_minutes("week"), Some(10080));
        assert_eq!(window_minutes("month"), Some(43200));
        assert_eq!(window_minutes(""), None);
        assert_eq!(window_minutes("year"), None);
    }
}
