//! Authorization-code login against the Spotify accounts service.
//!
//! The first run prints an authorize URL; the user approves access in a
//! browser and pastes back the URL they were redirected to. The resulting
//! token pair is cached as JSON under the data dir and refreshed before it
//! expires, so later runs start without a browser round-trip.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use spot_core::config::AuthConfig;

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this long before the server-side expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {message}")]
    Token { status: u16, message: String },
    #[error("invalid redirect url: {0}")]
    Redirect(String),
    #[error("authorization denied: {0}")]
    Denied(String),
    #[error("state parameter mismatch, the redirect does not belong to this login")]
    StateMismatch,
    #[error("no refresh token cached")]
    NoRefreshToken,
    #[error("token cache {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token cache is not valid json: {0}")]
    CacheFormat(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub scope: String,
}

impl CachedToken {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    /// True when every scope in `wanted` was granted to this token.
    pub fn covers_scope(&self, wanted: &str) -> bool {
        let granted: HashSet<&str> = self.scope.split_whitespace().collect();
        wanted.split_whitespace().all(|s| granted.contains(s))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

impl TokenResponse {
    /// Spotify may omit the refresh token and scope on refresh; the previous
    /// token's values carry over then.
    fn into_cached(self, previous: Option<&CachedToken>) -> CachedToken {
        let scope = match previous {
            Some(prev) if self.scope.trim().is_empty() => prev.scope.clone(),
            _ => self.scope,
        };
        CachedToken {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous.and_then(|prev| prev.refresh_token.clone())),
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
            scope,
        }
    }
}

/// Random value round-tripped through the redirect to tie it to this login.
pub fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Pull the authorization code out of the pasted redirect URL.
pub fn parse_redirect(redirected: &str, expected_state: &str) -> Result<String, AuthError> {
    let url = Url::parse(redirected.trim()).map_err(|e| AuthError::Redirect(e.to_string()))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::Denied(error));
    }
    if state.as_deref() != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }
    code.ok_or_else(|| AuthError::Redirect("no code parameter".into()))
}

pub fn load_cached(path: &Path) -> Result<Option<CachedToken>, AuthError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|source| AuthError::Cache {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(serde_json::from_str(&raw)?))
}

pub fn save_cached(path: &Path, token: &CachedToken) -> Result<(), AuthError> {
    let cache_err = |source| AuthError::Cache {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(cache_err)?;
    }
    let json = serde_json::to_string_pretty(token)?;
    std::fs::write(path, json).map_err(cache_err)
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    http: reqwest::Client,
    auth: AuthConfig,
    cache_path: PathBuf,
}

impl Authenticator {
    pub fn new(http: reqwest::Client, auth: AuthConfig, cache_path: PathBuf) -> Self {
        Self {
            http,
            auth,
            cache_path,
        }
    }

    pub fn authorize_url(&self, state: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.auth.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.auth.redirect_uri.as_str()),
                ("scope", self.auth.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::Redirect(e.to_string()))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<CachedToken, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.auth.redirect_uri.as_str()),
        ];
        let token = self.request_token(&form).await?.into_cached(None);
        self.persist(&token);
        info!("auth: authorization code exchanged");
        Ok(token)
    }

    pub async fn refresh(&self, current: &CachedToken) -> Result<CachedToken, AuthError> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let token = self
            .request_token(&form)
            .await?
            .into_cached(Some(current));
        self.persist(&token);
        debug!("auth: access token refreshed, expires {}", token.expires_at);
        Ok(token)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.auth.client_id, Some(&self.auth.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(AuthError::Token {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// A failed cache write only costs a login on the next start.
    fn persist(&self, token: &CachedToken) {
        if let Err(e) = save_cached(&self.cache_path, token) {
            warn!("auth: could not write token cache: {}", e);
        }
    }

    /// Cached token if still usable, refreshed if stale, otherwise an
    /// interactive login on stdin/stderr. Must run before the terminal UI
    /// takes over the screen.
    pub async fn obtain_token(&self) -> anyhow::Result<CachedToken> {
        match load_cached(&self.cache_path) {
            Ok(Some(token)) if !token.covers_scope(&self.auth.scope) => {
                info!("auth: cached token lacks requested scopes, logging in again");
            }
            Ok(Some(token)) if !token.is_expired() => {
                debug!("auth: using cached token");
                return Ok(token);
            }
            Ok(Some(token)) => match self.refresh(&token).await {
                Ok(fresh) => return Ok(fresh),
                Err(e) => warn!("auth: refresh failed, logging in again: {}", e),
            },
            Ok(None) => info!("auth: no cached token"),
            Err(e) => warn!("auth: ignoring unreadable token cache: {}", e),
        }
        self.interactive_login().await
    }

    async fn interactive_login(&self) -> anyhow::Result<CachedToken> {
        let state = random_state();
        let url = self.authorize_url(&state)?;

        eprintln!("Open this URL in a browser and approve access:\n\n  {}\n", url);
        eprint!("Then paste the URL you were redirected to: ");
        std::io::stderr().flush().ok();

        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await
        .context("stdin reader panicked")?
        .context("Failed to read redirect URL from stdin")?;

        let code = parse_redirect(&line, &state)?;
        let token = self
            .exchange_code(&code)
            .await
            .context("Failed to exchange authorization code")?;
        Ok(token)
    }
}
