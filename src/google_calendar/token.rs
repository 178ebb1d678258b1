use super::credentials::ClientSecret;
use crate::error::{auth_error, token_error, AppResult};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Tokens this close to expiry are treated as expired
const EXPIRY_MARGIN_SECONDS: i64 = 10;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// OAuth token as stored in `token.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// Expiry time, if any. Timestamps at or before the Unix epoch mean "no expiry".
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry.filter(|expiry| expiry.timestamp() > 0)
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at() {
            Some(expiry) => now + Duration::seconds(EXPIRY_MARGIN_SECONDS) < expiry,
            None => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Build a token from a token endpoint response, keeping `previous_refresh`
    /// when the response carries no new refresh token
    fn from_response(response: TokenResponse, previous_refresh: &str, now: DateTime<Utc>) -> Self {
        let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);

        Token {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: response
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| previous_refresh.to_string()),
            expiry: Some(now + Duration::seconds(expires_in)),
        }
    }
}

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

/// Error body of the token endpoint
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Reads and writes `token.json`
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token, failing if it is absent
    pub fn load(&self) -> AppResult<Token> {
        self.load_optional()?.ok_or_else(|| {
            token_error(&format!("No token found at {}", self.path.display()))
        })
    }

    /// Load the stored token; a missing file is `None`
    pub fn load_optional(&self) -> AppResult<Option<Token>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(token_error(&format!(
                    "Couldn't read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let token = serde_json::from_str(&content).map_err(|e| {
            token_error(&format!("Couldn't parse {}: {}", self.path.display(), e))
        })?;
        Ok(Some(token))
    }

    /// Write the token, readable by the owner only.
    /// The file is replaced by rename so a failed write never truncates it.
    pub fn save(&self, token: &Token) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_vec(token)?;
        let tmp_path = self.tmp_path();

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp_path)?;
        // mode() only applies on creation; a leftover temp file keeps its old bits
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(&content)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), "Token saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "token.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Exchanges and refreshes tokens against the client's token endpoint
#[derive(Debug, Clone)]
pub struct TokenManager {
    secret: ClientSecret,
    store: TokenStore,
    client: Client,
}

impl TokenManager {
    pub fn new(secret: ClientSecret, store: TokenStore, client: Client) -> Self {
        Self {
            secret,
            store,
            client,
        }
    }

    pub fn secret(&self) -> &ClientSecret {
        &self.secret
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Get a usable token, refreshing and persisting it when expired
    pub async fn get_token(&self) -> AppResult<Token> {
        let token = self.store.load()?;

        if token.is_valid() {
            return Ok(token);
        }

        if !token.has_refresh_token() {
            return Err(token_error(
                "Stored token has expired and has no refresh token",
            ));
        }

        info!("Access token expired, refreshing");
        let token = self.refresh(&token).await?;
        self.store.save(&token)?;
        Ok(token)
    }

    /// Refresh an access token using the token's refresh token
    pub async fn refresh(&self, token: &Token) -> AppResult<Token> {
        if !token.has_refresh_token() {
            return Err(token_error("No refresh token in token data"));
        }

        let params = [
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("refresh_token", token.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self.request_token(&params).await.map_err(|e| {
            token_error(&format!("Failed to refresh token: {}", e))
        })?;

        Ok(Token::from_response(response, &token.refresh_token, Utc::now()))
    }

    /// Exchange an authorization code for a token
    pub async fn exchange_code(&self, code: &str) -> AppResult<Token> {
        let params = [
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.secret.redirect_uri()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.request_token(&params).await.map_err(|e| {
            auth_error(&format!("Failed to exchange authorization code: {}", e))
        })?;

        Ok(Token::from_response(response, "", Utc::now()))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let response = self
            .client
            .post(&self.secret.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());

            return Err(match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => format!(
                    "HTTP {} - {}{}",
                    status,
                    err.error,
                    err.error_description
                        .map(|d| format!(": {}", d))
                        .unwrap_or_default()
                ),
                Err(_) => format!("HTTP {} - {}", status, body),
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| format!("Failed to parse token response: {}", e))
    }
}
