use crate::error::{credentials_error, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::Url;

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Used when the client file lists no redirect URIs
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// OAuth client from the Google Cloud Console client secret file
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// The file wraps the client in an `installed` or `web` key
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Read `credentials.json`
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            credentials_error(&format!(
                "Couldn't read credentials file from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(content)
            .map_err(|e| credentials_error(&format!("Couldn't parse credentials: {}", e)))?;

        let secret = file
            .installed
            .or(file.web)
            .ok_or_else(|| credentials_error("Expected an 'installed' or 'web' client entry"))?;

        if secret.client_id.is_empty() {
            return Err(credentials_error("Client id is empty"));
        }

        Ok(secret)
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }

    /// Consent page URL requesting offline, read-only calendar access
    pub fn authorization_url(&self, state: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.auth_uri)
            .map_err(|e| credentials_error(&format!("Invalid auth_uri '{}': {}", self.auth_uri, e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri())
            .append_pair("response_type", "code")
            .append_pair("scope", CALENDAR_READONLY_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", state);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTALLED: &str = r#"{
        "installed": {
            "client_id": "123.apps.googleusercontent.com",
            "project_id": "bar",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost:8080"]
        }
    }"#;

    #[test]
    fn test_parse_installed() {
        let secret = ClientSecret::from_json(INSTALLED).unwrap();
        assert_eq!(secret.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secret.client_secret, "shh");
        assert_eq!(secret.redirect_uri(), "http://localhost:8080");
    }

    #[test]
    fn test_parse_web_with_defaults() {
        let secret =
            ClientSecret::from_json(r#"{"web":{"client_id":"abc","client_secret":"def"}}"#).unwrap();
        assert_eq!(secret.token_uri, GOOGLE_TOKEN_URI);
        assert_eq!(secret.auth_uri, GOOGLE_AUTH_URI);
        assert_eq!(secret.redirect_uri(), DEFAULT_REDIRECT_URI);
    }

    #[test]
    fn test_rejects_unknown_layout() {
        assert!(ClientSecret::from_json(r#"{"other":{}}"#).is_err());
        assert!(ClientSecret::from_json("not json").is_err());
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir()
            .join(uuid::Uuid::new_v4().to_string())
            .join("credentials.json");
        let err = ClientSecret::load(&path).unwrap_err();
        assert!(err.to_string().contains("Couldn't read credentials file"));
    }

    #[test]
    fn test_authorization_url() {
        let secret = ClientSecret::from_json(INSTALLED).unwrap();
        let url = secret.authorization_url("state-1").unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(pairs["client_id"], "123.apps.googleusercontent.com");
        assert_eq!(pairs["redirect_uri"], "http://localhost:8080");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["access_type"], "offline");
        assert_eq!(pairs["scope"], CALENDAR_READONLY_SCOPE);
        assert_eq!(pairs["state"], "state-1");
    }
}
