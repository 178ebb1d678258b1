use crate::bar::Event;
use crate::error::AppResult;
use crate::utils::time::parse_event_start;
use serde::Deserialize;

/// Title shown for events without a summary
pub const UNTITLED_EVENT: &str = "(No title)";

/// Calendar event as returned by the events endpoint
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub start: EventDateTime,
}

/// Start or end of an event. Timed events carry `dateTime`, all-day events only `date`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

impl CalendarEvent {
    /// Convert to the bar's event type; all-day events have no start time and yield `None`
    pub fn to_bar_event(&self) -> AppResult<Option<Event>> {
        let Some(start) = self.start.date_time.as_deref() else {
            return Ok(None);
        };

        let summary = self
            .summary
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNTITLED_EVENT);

        Ok(Some(Event::new(parse_event_start(start)?, summary)))
    }
}

/// One page of the events list
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
}

/// Entry of the authenticated user's calendar list
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub id: String,
    pub description: Option<String>,
}

impl CalendarListEntry {
    /// `<id> <description>`
    pub fn line(&self) -> String {
        format!("{} {}", self.id, self.description.as_deref().unwrap_or(""))
    }
}

/// One page of the calendar list
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListPage {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_event_conversion() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"id":"e1","summary":"Standup","start":{"dateTime":"2024-01-01T09:05:00+02:00","timeZone":"Europe/Helsinki"}}"#,
        )
        .unwrap();

        let bar_event = event.to_bar_event().unwrap().unwrap();
        assert_eq!(bar_event.summary, "Standup");
        assert_eq!(bar_event.line(), "09:05 Standup");
    }

    #[test]
    fn test_all_day_event_is_skipped() {
        let event: CalendarEvent =
            serde_json::from_str(r#"{"id":"e2","summary":"Holiday","start":{"date":"2024-01-01"}}"#)
                .unwrap();
        assert!(event.to_bar_event().unwrap().is_none());
    }

    #[test]
    fn test_missing_summary() {
        let event: CalendarEvent =
            serde_json::from_str(r#"{"id":"e3","start":{"dateTime":"2024-01-01T10:00:00Z"}}"#)
                .unwrap();
        assert_eq!(event.to_bar_event().unwrap().unwrap().summary, UNTITLED_EVENT);
    }

    #[test]
    fn test_malformed_start() {
        let event: CalendarEvent =
            serde_json::from_str(r#"{"id":"e4","start":{"dateTime":"tomorrow"}}"#).unwrap();
        assert!(event.to_bar_event().is_err());
    }

    #[test]
    fn test_calendar_line() {
        let entry = CalendarListEntry {
            id: "primary@example.com".to_string(),
            description: Some("Work stuff".to_string()),
        };
        assert_eq!(entry.line(), "primary@example.com Work stuff");

        let bare = CalendarListEntry {
            id: "x".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.line(), "x ");
    }
}
