use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(waybar_gcal::config))]
    Config(String),

    #[error("Credentials error: {0}")]
    #[diagnostic(
        code(waybar_gcal::credentials),
        help("Download the OAuth client file from the Google Cloud Console and save it as credentials.json in the config directory")
    )]
    Credentials(String),

    #[error("Token error: {0}")]
    #[diagnostic(code(waybar_gcal::token), help("Run `waybar-gcal setup` to authorize access"))]
    Token(String),

    #[error("Authorization failed: {0}")]
    #[diagnostic(code(waybar_gcal::authorization))]
    Authorization(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(waybar_gcal::google_calendar))]
    GoogleCalendar(String),

    #[error(transparent)]
    #[diagnostic(code(waybar_gcal::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(waybar_gcal::serialization))]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create credentials errors
pub fn credentials_error(message: &str) -> Error {
    Error::Credentials(message.to_string())
}

/// Helper to create token errors
pub fn token_error(message: &str) -> Error {
    Error::Token(message.to_string())
}

/// Helper to create authorization errors
pub fn auth_error(message: &str) -> Error {
    Error::Authorization(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}
