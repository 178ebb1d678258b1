use super::credentials::ClientSecret;
use super::models::{CalendarEvent, CalendarListEntry, CalendarListPage, EventsPage};
use super::token::{Token, TokenManager, TokenStore};
use crate::config::Config;
use crate::error::{google_calendar_error, AppResult};
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Upper bound the API accepts for page sizes
const MAX_RESULTS: &str = "250";

/// Client for the two Calendar API operations this tool needs
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: Url,
    token_manager: TokenManager,
}

impl GoogleCalendarClient {
    pub fn new(base_url: &str, token_manager: TokenManager, client: Client) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            google_calendar_error(&format!("Failed to parse URL '{}': {}", base_url, e))
        })?;

        Ok(Self {
            client,
            base_url,
            token_manager,
        })
    }

    /// Build a client from the credentials and token files in the config directory
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let secret = ClientSecret::load(&config.credentials_path())?;
        let client = Client::new();
        let token_manager = TokenManager::new(
            secret,
            TokenStore::new(config.token_path()),
            client.clone(),
        );

        Self::new(&config.api_base_url, token_manager, client)
    }

    /// All calendars visible to the authenticated account
    pub async fn list_calendars(&self) -> AppResult<Vec<CalendarListEntry>> {
        let token = self.token_manager.get_token().await?;
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["users", "me", "calendarList"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("maxResults", MAX_RESULTS);
                if let Some(page) = &page_token {
                    query.append_pair("pageToken", page);
                }
            }

            let page: CalendarListPage = self.get(url, &token).await?;
            calendars.extend(page.items);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(count = calendars.len(), "Fetched calendar list");
        Ok(calendars)
    }

    /// Events of a calendar within `[time_min, time_max)`, recurring events expanded
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: &DateTime<FixedOffset>,
        time_max: &DateTime<FixedOffset>,
    ) -> AppResult<Vec<CalendarEvent>> {
        let token = self.token_manager.get_token().await?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["calendars", calendar_id, "events"])?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("timeMin", &time_min.to_rfc3339())
                    .append_pair("timeMax", &time_max.to_rfc3339())
                    .append_pair("singleEvents", "true")
                    .append_pair("maxResults", MAX_RESULTS);
                if let Some(page) = &page_token {
                    query.append_pair("pageToken", page);
                }
            }

            let page: EventsPage = self.get(url, &token).await?;
            events.extend(page.items);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(calendar_id, count = events.len(), "Fetched events");
        Ok(events)
    }

    /// Base URL with the given path segments appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API base URL cannot have a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, token: &Token) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse response: {}", e)))
    }
}
