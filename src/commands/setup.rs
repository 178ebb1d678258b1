//! Interactive token setup.
//!
//! A stored token with a refresh token is refreshed and saved again. Otherwise
//! the user goes through the authorization-code flow:
//!
//! `NeedAuthorization -> AwaitingCode -> Exchanging -> Persisted`
//!
//! A failed exchange goes back to `AwaitingCode` once before giving up.

use crate::config::Config;
use crate::error::{auth_error, AppResult};
use crate::google_calendar::{ClientSecret, Token, TokenManager, TokenStore};
use reqwest::Client;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Code exchanges allowed before setup fails
const MAX_EXCHANGE_ATTEMPTS: u8 = 2;

#[derive(Debug)]
enum AuthState {
    NeedAuthorization,
    AwaitingCode { attempt: u8 },
    Exchanging { input: String, attempt: u8 },
    Persisted(Token),
}

/// Make sure `token.json` holds a usable token
pub async fn setup<R, W>(
    config: &Config,
    reader: R,
    output: &mut W,
    open_browser: bool,
) -> AppResult<Token>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let secret = ClientSecret::load(&config.credentials_path())?;
    let manager = TokenManager::new(secret, TokenStore::new(config.token_path()), Client::new());

    let stored = match manager.store().load_optional() {
        Ok(token) => token,
        Err(e) => {
            warn!("Ignoring unusable stored token: {}", e);
            None
        }
    };

    if let Some(token) = stored.filter(Token::has_refresh_token) {
        match manager.refresh(&token).await {
            Ok(token) => {
                manager.store().save(&token)?;
                info!("Stored token refreshed");
                writeln!(
                    output,
                    "Token is valid and saved to {}",
                    manager.store().path().display()
                )?;
                return Ok(token);
            }
            Err(e) => warn!("{}; authorization required", e),
        }
    }

    authorize(&manager, reader, output, open_browser).await
}

async fn authorize<R, W>(
    manager: &TokenManager,
    mut reader: R,
    output: &mut W,
    open_browser: bool,
) -> AppResult<Token>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let state = Uuid::new_v4().to_string();
    let mut step = AuthState::NeedAuthorization;

    loop {
        step = match step {
            AuthState::NeedAuthorization => {
                let url = manager.secret().authorization_url(&state)?;
                writeln!(output, "Open this URL in a browser to authorize access:")?;
                writeln!(output, "{}", url)?;

                if open_browser {
                    if let Err(e) = webbrowser::open(url.as_str()) {
                        debug!("Could not open browser: {}", e);
                    }
                }

                AuthState::AwaitingCode { attempt: 1 }
            }
            AuthState::AwaitingCode { attempt } => {
                write!(output, "Authorization code (or the full redirect URL): ")?;
                output.flush()?;

                let input = read_code(&mut reader).await?;
                AuthState::Exchanging { input, attempt }
            }
            AuthState::Exchanging { input, attempt } => {
                let result = match parse_authorization_input(&input, &state) {
                    Ok(code) => manager.exchange_code(&code).await,
                    Err(e) => Err(e),
                };

                match result {
                    Ok(token) => {
                        manager.store().save(&token)?;
                        AuthState::Persisted(token)
                    }
                    Err(e) if attempt < MAX_EXCHANGE_ATTEMPTS => {
                        warn!(attempt, "{}", e);
                        writeln!(output, "{}", e)?;
                        AuthState::AwaitingCode {
                            attempt: attempt + 1,
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
            AuthState::Persisted(token) => {
                info!("Authorization complete");
                writeln!(output, "Token saved to {}", manager.store().path().display())?;
                return Ok(token);
            }
        };
    }
}

/// Next non-blank line of input
async fn read_code<R: AsyncBufRead + Unpin>(reader: &mut R) -> AppResult<String> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(auth_error("No authorization code entered"));
        }

        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
}

/// Accept a bare code or the redirect URL carrying `code` and `state`
fn parse_authorization_input(input: &str, expected_state: &str) -> AppResult<String> {
    let input = input.trim();

    if !(input.starts_with("http://") || input.starts_with("https://")) {
        if input.is_empty() {
            return Err(auth_error("Authorization code is empty"));
        }
        return Ok(input.to_string());
    }

    let url = Url::parse(input).map_err(|e| auth_error(&format!("Invalid redirect URL: {}", e)))?;
    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(auth_error(&format!("Authorization was denied: {}", value)));
            }
            _ => {}
        }
    }

    if let Some(state) = state {
        if state != expected_state {
            return Err(auth_error("State parameter does not match this authorization request"));
        }
    }

    code.filter(|c| !c.is_empty())
        .ok_or_else(|| auth_error("No authorization code found in redirect URL"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_code() {
        assert_eq!(parse_authorization_input("  4/0Ab-xyz \n", "s").unwrap(), "4/0Ab-xyz");
        assert!(parse_authorization_input("   ", "s").is_err());
    }

    #[test]
    fn test_redirect_url() {
        let code =
            parse_authorization_input("http://localhost/?state=s1&code=4%2F0Ab&scope=x", "s1")
                .unwrap();
        assert_eq!(code, "4/0Ab");
    }

    #[test]
    fn test_redirect_url_state_mismatch() {
        let err = parse_authorization_input("http://localhost/?state=other&code=abc", "s1")
            .unwrap_err();
        assert!(err.to_string().contains("State parameter"));
    }

    #[test]
    fn test_redirect_url_denied() {
        assert!(parse_authorization_input("http://localhost/?error=access_denied", "s1").is_err());
        assert!(parse_authorization_input("http://localhost/?state=s1", "s1").is_err());
    }

    #[tokio::test]
    async fn test_read_code_skips_blank_lines() {
        let mut reader: &[u8] = b"\n   \n code-1 \nnext\n";
        assert_eq!(read_code(&mut reader).await.unwrap(), "code-1");
        assert_eq!(read_code(&mut reader).await.unwrap(), "next");
        assert!(read_code(&mut reader).await.is_err());
    }
}
