#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use std::fs;
use std::path::PathBuf;
use waybar_gcal::config::Config;
use waybar_gcal::google_calendar::Token;

/// Fresh, empty config directory under the system temp dir
pub fn config_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("waybar-gcal-test-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write credentials.json pointing the token endpoint at the mock server
pub fn write_credentials(dir: &PathBuf, server_url: &str) {
    let credentials = format!(
        r#"{{
            "installed": {{
                "client_id": "test-client.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "{}/token",
                "redirect_uris": ["http://localhost"]
            }}
        }}"#,
        server_url
    );
    fs::write(dir.join("credentials.json"), credentials).unwrap();
}

/// Write config.toml pointing the Calendar API at the mock server
pub fn write_settings(dir: &PathBuf, server_url: &str) {
    fs::write(
        dir.join("config.toml"),
        format!("api_base_url = \"{}\"\n", server_url),
    )
    .unwrap();
}

pub fn write_token(dir: &PathBuf, token: &Token) {
    fs::write(dir.join("token.json"), serde_json::to_string(token).unwrap()).unwrap();
}

pub fn read_token(dir: &PathBuf) -> Token {
    serde_json::from_str(&fs::read_to_string(dir.join("token.json")).unwrap()).unwrap()
}

pub fn valid_token() -> Token {
    Token {
        access_token: "valid-access".to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: "refresh-1".to_string(),
        expiry: Some(Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap()),
    }
}

pub fn expired_token() -> Token {
    Token {
        access_token: "stale-access".to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: "refresh-1".to_string(),
        expiry: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
    }
}

/// Config directory wired to the mock server, with credentials and settings in place
pub fn mock_config(server_url: &str) -> (Config, PathBuf) {
    let dir = config_dir();
    write_credentials(&dir, server_url);
    write_settings(&dir, server_url);
    let config = Config::from_dir(dir.clone()).unwrap();
    (config, dir)
}
