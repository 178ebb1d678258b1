use crate::error::{config_error, AppResult};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the credential and token files
pub const DEFAULT_CONFIG_DIR: &str = "${HOME}/.config/waybar-gcal";

/// Calendar queried by `run` when none is configured
pub const DEFAULT_CALENDAR: &str = "primary";

/// Google Calendar v3 REST endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const TOKEN_FILE: &str = "token.json";
pub const SETTINGS_FILE: &str = "config.toml";

const HOME_PLACEHOLDER: &str = "${HOME}";

/// Optional settings read from `config.toml`
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default calendar id for `run`
    pub calendar: Option<String>,
    /// Override for the Calendar API base URL
    pub api_base_url: Option<String>,
}

/// Resolved configuration, built once in `main` and passed down
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding credentials.json, token.json and config.toml
    pub config_dir: PathBuf,
    /// Calendar used when `run` gets no `--calendar`
    pub calendar: String,
    /// Base URL of the Calendar API
    pub api_base_url: String,
}

impl Config {
    /// Load configuration for the given (unexpanded) config directory
    pub fn load(config_dir: &str) -> AppResult<Self> {
        Self::from_dir(expand_home(config_dir))
    }

    /// Build configuration from an already resolved directory
    pub fn from_dir(config_dir: PathBuf) -> AppResult<Self> {
        let settings = read_settings(&config_dir.join(SETTINGS_FILE))?;

        let calendar = settings
            .calendar
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CALENDAR.to_string());

        let api_base_url = settings
            .api_base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        debug!(config_dir = %config_dir.display(), %calendar, "Configuration loaded");

        Ok(Config {
            config_dir,
            calendar,
            api_base_url,
        })
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.config_dir.join(CREDENTIALS_FILE)
    }

    pub fn token_path(&self) -> PathBuf {
        self.config_dir.join(TOKEN_FILE)
    }

    /// Pick the calendar id: explicit flag first, then the configured default
    pub fn calendar_id<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        match flag {
            Some(id) if !id.is_empty() => id,
            _ => &self.calendar,
        }
    }
}

/// Read `config.toml`, treating a missing file as empty settings
fn read_settings(path: &Path) -> AppResult<Settings> {
    match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).map_err(|e| {
            config_error(&format!("Couldn't parse {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(config_error(&format!(
            "Couldn't read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Expand a literal `${HOME}` to the current user's home directory
pub fn expand_home(dir: &str) -> PathBuf {
    expand_home_with(dir, dirs::home_dir().as_deref())
}

fn expand_home_with(dir: &str, home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(dir.replace(HOME_PLACEHOLDER, &home.to_string_lossy())),
        // Without a home directory the path is used as given
        None => PathBuf::from(dir),
    }
}
