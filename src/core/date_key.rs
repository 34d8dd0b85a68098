use chrono::{NaiveDate, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical `YYYY-MM-DD` shape shared by date keys and persisted day-state
/// keys.
static DATE_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Format a calendar day as its canonical date key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a canonical date key back into a calendar day. Returns `None` for
/// anything that is not a valid `YYYY-MM-DD` date.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if !DATE_KEY_RE.is_match(key) {
        return None;
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// UTC midnight of the day in epoch milliseconds. Deterministic across host
/// timezone changes, which keeps sort order stable between recomputes.
pub fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Local calendar day of an epoch-millisecond timestamp.
pub fn day_of_millis(millis: i64) -> Option<NaiveDate> {
    chrono::Utc
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.with_timezone(&chrono::Local).date_naive())
}
