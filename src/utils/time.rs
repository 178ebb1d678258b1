use crate::error::{google_calendar_error, AppResult};
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, TimeZone};

/// Format a start time as 24-hour `HH:MM` in its own offset
pub fn format_clock(time: &DateTime<FixedOffset>) -> String {
    time.format("%H:%M").to_string()
}

/// Parse an RFC 3339 timestamp as returned by the Calendar API, keeping its offset
pub fn parse_event_start(value: &str) -> AppResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| google_calendar_error(&format!("Failed to parse datetime '{}': {}", value, e)))
}

/// Midnight at the start of `date` in the given timezone
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> AppResult<DateTime<Tz>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| google_calendar_error("Failed to create datetime"))?;

    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(google_calendar_error(&format!(
            "Midnight of {} does not exist in the local timezone",
            date
        ))),
    }
}

/// The half-open day window `[today 00:00, tomorrow 00:00)` around `now`
pub fn day_window<Tz: TimeZone>(now: &DateTime<Tz>) -> AppResult<(DateTime<Tz>, DateTime<Tz>)> {
    let tz = now.timezone();
    let today = now.date_naive();
    let tomorrow = today
        .succ_opt()
        .ok_or_else(|| google_calendar_error("Date out of range"))?;

    Ok((start_of_day(&tz, today)?, start_of_day(&tz, tomorrow)?))
}
