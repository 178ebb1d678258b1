use crate::config::Config;
use crate::error::AppResult;
use crate::google_calendar::GoogleCalendarClient;

/// One `<id> <description>` line per visible calendar
pub async fn list(config: &Config) -> AppResult<Vec<String>> {
    let client = GoogleCalendarClient::from_config(config)?;
    let calendars = client.list_calendars().await?;

    Ok(calendars.iter().map(|calendar| calendar.line()).collect())
}
