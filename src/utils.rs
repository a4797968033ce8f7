use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a Spotify album release date into a calendar date.
///
/// Spotify reports release dates with a precision of `year`, `month` or
/// `day`. Coarser dates resolve to the first day of their period. When the
/// precision is missing it is inferred from the shape of the string.
pub fn parse_release_date(date: &str, precision: Option<&str>) -> Option<NaiveDate> {
    let date = date.trim();
    let precision = precision.unwrap_or(match date.len() {
        4 => "year",
        7 => "month",
        _ => "day",
    });

    match precision {
        "year" => date
            .parse::<i32>()
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
        "month" => NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
    }
}

/// Returns the next wall-clock moment at `at` that lies strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value.trim(), "%H:%M:%S"))
        .ok()
}

/// Formats a track duration as `m:ss`.
pub fn format_duration(duration_ms: u64) -> String {
    let secs = duration_ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Toggles membership of `item` in `list`, keeping insertion order.
///
/// Returns `false` when the list already was in the requested state.
pub fn set_membership(list: &mut Vec<String>, item: &str, present: bool) -> bool {
    let position = list.iter().position(|i| i == item);
    match (position, present) {
        (None, true) => {
            list.push(item.to_string());
            true
        }
        (Some(idx), false) => {
            list.remove(idx);
            true
        }
        _ => false,
    }
}
