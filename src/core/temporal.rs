use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static MONTH_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<year>\d{4})-(?P<month>\d{2})$").unwrap());

/// The `"YYYY-MM"` key a monthly entry is filed under.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Validate a month key and return the first day of that month.
pub fn parse_month_key(key: &str) -> Option<NaiveDate> {
    let caps = MONTH_KEY_RE.captures(key)?;
    let year: i32 = caps["year"].parse().ok()?;
    let month: u32 = caps["month"].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Week-of-month, 1-based: days 1-7 are week 1, 8-14 week 2, and so on.
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() + 6) / 7
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // First of next month always exists; its predecessor is the last day.
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

pub fn days_remaining_in_month(date: NaiveDate) -> u32 {
    last_day_of_month(date).day() - date.day()
}

/// The trailing window in which the current month's reflection snapshot is
/// editable. Past and future months never pass through here; the timeline
/// shows them read-only regardless.
pub fn in_snapshot_window(date: NaiveDate) -> bool {
    days_remaining_in_month(date) <= 7
}
