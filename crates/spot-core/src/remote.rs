//! The remote playback capability the core consumes.
//!
//! Every operation is fallible with [`RemoteError`]. The core never lets one
//! of these escape: the reconciler skips the period, transport commands log
//! and carry on.

use std::future::Future;

use thiserror::Error;

use crate::protocol::{Device, RemotePlaybackState, TrackSummary};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authorization failed: {0}")]
    Auth(String),
    #[error("rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("no active playback device")]
    NoActiveDevice,
    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Failures that a later retry cannot fix without user action.
    pub fn is_auth(&self) -> bool {
        matches!(self, RemoteError::Auth(_))
    }
}

pub trait RemotePlayback: Send + Sync + 'static {
    /// Current playback, or `None` when nothing is loaded on any device.
    fn fetch_current_playback(
        &self,
    ) -> impl Future<Output = Result<Option<RemotePlaybackState>, RemoteError>> + Send;

    fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<TrackSummary>, RemoteError>> + Send;

    fn play(
        &self,
        track_uri: &str,
        device_id: Option<&str>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn pause(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn resume(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn skip_next(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn skip_previous(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, RemoteError>> + Send;
}
