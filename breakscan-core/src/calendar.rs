//! Calendar arithmetic: weekday-span durations and quarter labels.
//!
//! Durations count every weekday as a trading day — no holiday calendar.
//! Swapping in a holiday-aware calendar means replacing `business_day_span`
//! and nothing else.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Count of weekdays between `start` and `end` inclusive, minus one.
///
/// This is the duration unit for breakout events: a breakout that starts
/// and ends on the same day has duration 0; Friday to Monday is 1.
/// Returns 0 when `end` precedes `start` or the span contains no weekday.
pub fn business_day_span(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    let total_days = (end - start).num_days() + 1;
    let full_weeks = total_days / 7;
    let mut count = full_weeks * 5;
    let mut day = start + Duration::days(full_weeks * 7);
    while day <= end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        day = day + Duration::days(1);
    }
    (count - 1).max(0)
}

/// Quarter label for a date: `"2024Q3"`.
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}Q{}", date.year(), (date.month() - 1) / 3 + 1)
}
