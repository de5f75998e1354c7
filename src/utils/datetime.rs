//! Date and time utility functions
//!
//! Task dates are plain `YYYY-MM-DD` strings and creation stamps are RFC 3339
//! strings produced from the client clock. Nothing here normalizes time zones;
//! stored values are kept exactly as given.

use chrono::{Datelike, Duration, Local, NaiveDate, SecondsFormat, Utc, Weekday};

/// Date format used for `dueDate` values and list filtering
pub const TASK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date string in YYYY-MM-DD format to NaiveDate
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, TASK_DATE_FORMAT)
}

/// Format a NaiveDate to YYYY-MM-DD string
pub fn format_ymd(d: NaiveDate) -> String {
    d.format(TASK_DATE_FORMAT).to_string()
}

/// Format current local date to YYYY-MM-DD string
pub fn format_today() -> String {
    format_ymd(Local::now().date_naive())
}

/// Format date with offset from today to YYYY-MM-DD string
pub fn format_date_with_offset(days_offset: i64) -> String {
    let target_date = Local::now().date_naive() + Duration::days(days_offset);
    format_ymd(target_date)
}

/// Current UTC instant as an RFC 3339 string with millisecond precision,
/// e.g. `2025-01-15T14:30:00.123Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a due date the way the task list shows it ("today", "tomorrow",
/// "next Friday", "Jan 15").
///
/// Strings that do not parse as a date are returned unchanged.
pub fn format_human_date(date_str: &str) -> String {
    let input_date = match parse_date(date_str) {
        Ok(date) => date,
        Err(_) => return date_str.to_string(),
    };

    let today = Local::now().date_naive();
    let days_diff = (input_date - today).num_days();

    match days_diff {
        -1 => "yesterday".to_string(),
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        diff if diff > 1 && diff <= 7 => format!("next {}", weekday_name(input_date.weekday())),
        diff if diff < -1 => format!("overdue ({})", input_date.format("%b %d")),
        _ => {
            if input_date.year() == today.year() {
                input_date.format("%b %d").to_string()
            } else {
                input_date.format("%b %d, %Y").to_string()
            }
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
