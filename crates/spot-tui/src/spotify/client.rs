//! `RemotePlayback` over the Spotify Web API.

use reqwest::header::{CONTENT_LENGTH, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use spot_core::protocol::{Device, RemotePlaybackState, TrackSummary};
use spot_core::remote::{RemoteError, RemotePlayback};

use super::auth::{Authenticator, CachedToken};
use super::model::{CurrentlyPlaying, DevicesResponse, ErrorResponse, SearchResponse};

pub const API_BASE: &str = "https://api.spotify.com/v1";

pub struct SpotifyClient {
    http: reqwest::Client,
    auth: Authenticator,
    token: Mutex<CachedToken>,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, auth: Authenticator, token: CachedToken) -> Self {
        Self {
            http,
            auth,
            token: Mutex::new(token),
        }
    }

    /// Current access token, refreshed first when it is about to expire.
    async fn bearer(&self) -> Result<String, RemoteError> {
        let mut token = self.token.lock().await;
        if token.is_expired() {
            let fresh = self
                .auth
                .refresh(&token)
                .await
                .map_err(|e| RemoteError::Auth(e.to_string()))?;
            *token = fresh;
        }
        Ok(token.access_token.clone())
    }

    /// A 401 means the token was revoked early; force a refresh next call.
    async fn invalidate_token(&self) {
        let mut token = self.token.lock().await;
        token.expires_at = chrono::Utc::now();
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RemoteError> {
        let bearer = self.bearer().await?;
        Ok(self
            .http
            .request(method, format!("{API_BASE}{path}"))
            .bearer_auth(bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let body = response.text().await.unwrap_or_default();
        let err = classify(status, retry_after, &body);
        if err.is_auth() {
            self.invalidate_token().await;
        }
        Err(err)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RemoteError> {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// Player commands without a body still need an explicit zero length.
    async fn command(&self, method: Method, path: &str) -> Result<(), RemoteError> {
        let builder = self.request(method, path).await?.header(CONTENT_LENGTH, "0");
        self.send(builder).await?;
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_decode() {
        RemoteError::Decode(e.to_string())
    } else {
        RemoteError::Network(e.to_string())
    }
}

/// Map a non-success response onto the error the core understands.
pub fn classify(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> RemoteError {
    let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
    let message = match &parsed {
        Some(resp) if !resp.error.message.is_empty() => resp.error.message.clone(),
        _ => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    };
    let reason = parsed.and_then(|resp| resp.error.reason);

    match status {
        StatusCode::UNAUTHORIZED => RemoteError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited { retry_after_secs },
        StatusCode::NOT_FOUND if reason.as_deref() == Some("NO_ACTIVE_DEVICE") => {
            RemoteError::NoActiveDevice
        }
        _ => RemoteError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

impl RemotePlayback for SpotifyClient {
    async fn fetch_current_playback(&self) -> Result<Option<RemotePlaybackState>, RemoteError> {
        let builder = self
            .request(Method::GET, "/me/player")
            .await?
            .query(&[("additional_types", "track,episode")]);
        let response = self.send(builder).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let current: CurrentlyPlaying = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(current.into_remote_state())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<TrackSummary>, RemoteError> {
        let limit = limit.clamp(1, 50).to_string();
        let builder = self.request(Method::GET, "/search").await?.query(&[
            ("q", query),
            ("type", "track"),
            ("limit", limit.as_str()),
        ]);
        let resp: SearchResponse = self.json(builder).await?;
        let items = resp.tracks.map(|page| page.items).unwrap_or_default();
        debug!("spotify: search {:?} returned {} tracks", query, items.len());
        Ok(items.into_iter().map(|item| item.into_summary()).collect())
    }

    async fn play(&self, track_uri: &str, device_id: Option<&str>) -> Result<(), RemoteError> {
        let mut builder = self
            .request(Method::PUT, "/me/player/play")
            .await?
            .json(&serde_json::json!({ "uris": [track_uri] }));
        if let Some(id) = device_id {
            builder = builder.query(&[("device_id", id)]);
        }
        self.send(builder).await?;
        Ok(())
    }

    async fn pause(&self) -> Result<(), RemoteError> {
        self.command(Method::PUT, "/me/player/pause").await
    }

    async fn resume(&self) -> Result<(), RemoteError> {
        self.command(Method::PUT, "/me/player/play").await
    }

    async fn skip_next(&self) -> Result<(), RemoteError> {
        self.command(Method::POST, "/me/player/next").await
    }

    async fn skip_previous(&self) -> Result<(), RemoteError> {
        self.command(Method::POST, "/me/player/previous").await
    }

    async fn list_devices(&self) -> Result<Vec<Device>, RemoteError> {
        let builder = self.request(Method::GET, "/me/player/devices").await?;
        let resp: DevicesResponse = self.json(builder).await?;
        let devices = resp.into_devices();
        if devices.is_empty() {
            warn!("spotify: no controllable devices, open Spotify on a device first");
        }
        Ok(devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unauthorized() {
        let err = classify(
            StatusCode::UNAUTHORIZED,
            None,
            r#"{"error": {"status": 401, "message": "The access token expired"}}"#,
        );
        assert_eq!(err, RemoteError::Auth("The access token expired".into()));
        assert!(err.is_auth());
    }

    #[test]
    fn test_classify_no_active_device() {
        let err = classify(
            StatusCode::NOT_FOUND,
            None,
            r#"{"error": {"status": 404, "message": "Player command failed: No active device found", "reason": "NO_ACTIVE_DEVICE"}}"#,
        );
        assert_eq!(err, RemoteError::NoActiveDevice);
    }

    #[test]
    fn test_classify_rate_limited_keeps_retry_after() {
        let err = classify(StatusCode::TOO_MANY_REQUESTS, Some(7), "");
        assert_eq!(
            err,
            RemoteError::RateLimited {
                retry_after_secs: Some(7)
            }
        );
    }

    #[test]
    fn test_classify_other_status_falls_back_to_reason_phrase() {
        let err = classify(StatusCode::BAD_GATEWAY, None, "<html>oops</html>");
        assert_eq!(
            err,
            RemoteError::Status {
                status: 502,
                message: "Bad Gateway".into()
            }
        );

        let err = classify(
            StatusCode::FORBIDDEN,
            None,
            r#"{"error": {"status": 403, "message": "Player command failed: Premium required", "reason": "PREMIUM_REQUIRED"}}"#,
        );
        assert!(matches!(err, RemoteError::Status { status: 403, ref message } if message.contains("Premium")));
    }
}
