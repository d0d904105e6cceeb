// src/format.rs
//
// Display formatting for durations, player clock and dates.

use chrono::{DateTime, Utc};

/// `M:SS` below an hour, `H:MM:SS` above
pub fn format_duration(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Player clock: minutes keep counting past the hour
pub fn format_time(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// e.g. `Jan 5, 2024`
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "Unknown".to_string(),
    }
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}
