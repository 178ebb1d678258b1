use crate::bar::{build_bar_item, BarItem, Event};
use crate::config::Config;
use crate::error::AppResult;
use crate::google_calendar::{CalendarEvent, GoogleCalendarClient};
use crate::utils::time::day_window;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info};

/// Fetch the day's events around `now` and build the bar item
pub async fn run<Tz: TimeZone>(
    config: &Config,
    calendar: Option<&str>,
    now: &DateTime<Tz>,
) -> AppResult<BarItem> {
    let calendar_id = config.calendar_id(calendar);
    let (from, to) = day_window(now)?;

    let client = GoogleCalendarClient::from_config(config)?;
    let events = client
        .list_events(calendar_id, &from.fixed_offset(), &to.fixed_offset())
        .await?;

    let events = timed_events(&events)?;
    info!(calendar_id, count = events.len(), "Fetched today's events");

    Ok(build_bar_item(events, now.with_timezone(&Utc)))
}

/// Events with a time of day; all-day entries are left out
fn timed_events(events: &[CalendarEvent]) -> AppResult<Vec<Event>> {
    let mut timed = Vec::with_capacity(events.len());
    for event in events {
        match event.to_bar_event()? {
            Some(bar_event) => timed.push(bar_event),
            None => debug!(id = %event.id, "Skipping all-day event"),
        }
    }
    Ok(timed)
}
