//! Status-bar item built from a day's events.
//!
//! Events are ordered by start time (stable for equal starts) and the first
//! one that started less than [`GRACE_PERIOD_MINUTES`] ago, or has yet to
//! start, becomes the bar text. The tooltip always lists the whole day.

use crate::error::AppResult;
use crate::utils::time::format_clock;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Serialize;

/// How long after its start an event still counts as next
pub const GRACE_PERIOD_MINUTES: i64 = 5;

/// Event as seen by the bar: start time and title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub start: DateTime<FixedOffset>,
    pub summary: String,
}

impl Event {
    pub fn new(start: DateTime<FixedOffset>, summary: impl Into<String>) -> Self {
        Self {
            start,
            summary: summary.into(),
        }
    }

    /// `HH:MM summary`
    pub fn line(&self) -> String {
        format!("{} {}", format_clock(&self.start), self.summary)
    }

    /// Whether the event is still upcoming at `now`, grace window included
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        let grace_end = self.start + Duration::minutes(GRACE_PERIOD_MINUTES);
        now < grace_end.with_timezone(&Utc)
    }
}

/// Output record consumed by Waybar's custom module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BarItem {
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tooltip: String,
}

impl BarItem {
    /// Single-line JSON representation
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Sort events by start time; equal starts keep their input order
pub fn sort_events(events: &mut [Event]) {
    // slice::sort_by_key is a stable sort
    events.sort_by_key(|event| event.start);
}

/// First upcoming event of an already sorted list
pub fn select_next(sorted: &[Event], now: DateTime<Utc>) -> Option<&Event> {
    sorted.iter().find(|event| event.is_upcoming(now))
}

/// Build the bar item for a day's events
pub fn build_bar_item(mut events: Vec<Event>, now: DateTime<Utc>) -> BarItem {
    if events.is_empty() {
        return BarItem::default();
    }

    sort_events(&mut events);

    let tooltip = events
        .iter()
        .map(|event| format!("{}\n", event.line()))
        .collect::<String>();

    let text = select_next(&events, now)
        .map(Event::line)
        .unwrap_or_default();

    BarItem { text, tooltip }
}
