//! Remote poll loop: the single source of truth refresh.
//!
//! Every period the reconciler fetches the remote playback state and merges
//! it into the shared snapshot. Failures are logged and skipped; the next
//! period simply tries again. No backoff: a fetch is idempotent and cheap.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::remote::{RemoteError, RemotePlayback};
use crate::state::{Reconciled, SharedPlaybackState};

/// Result of one poll, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Reconciled(Reconciled),
    /// Fetch succeeded but nothing is loaded remotely; state left untouched.
    NoActiveTrack,
    /// Fetch failed; state left untouched.
    Failed(RemoteError),
}

pub struct RemoteStateReconciler<R> {
    remote: Arc<R>,
    state: SharedPlaybackState,
    period: Duration,
}

impl<R: RemotePlayback> RemoteStateReconciler<R> {
    pub fn new(remote: Arc<R>, state: SharedPlaybackState, period: Duration) -> Self {
        Self {
            remote,
            state,
            period,
        }
    }

    /// Fetch once and merge. The lock is only taken after the fetch returns.
    pub async fn poll_once(&self) -> PollOutcome {
        match self.remote.fetch_current_playback().await {
            Ok(Some(remote)) => {
                let observed_at = Instant::now();
                PollOutcome::Reconciled(self.state.reconcile_from_remote(remote, observed_at).await)
            }
            Ok(None) => {
                debug!("reconciler: no active track");
                PollOutcome::NoActiveTrack
            }
            Err(e) => {
                if e.is_auth() {
                    warn!("reconciler: fetch failed, check credentials: {}", e);
                } else {
                    warn!("reconciler: fetch failed: {}", e);
                }
                PollOutcome::Failed(e)
            }
        }
    }

    /// Poll every `period` until cancelled. Cancellation is only observed
    /// between polls, so an in-flight fetch always completes or fails first.
    pub async fn run(self, cancel: CancellationToken) {
        debug!("reconciler: started, period={:?}", self.period);
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut consecutive_failures = 0u32;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            match self.poll_once().await {
                PollOutcome::Failed(_) => consecutive_failures += 1,
                _ => {
                    if consecutive_failures > 0 {
                        debug!("reconciler: recovered after {} failed polls", consecutive_failures);
                    }
                    consecutive_failures = 0;
                }
            }
        }
        debug!("reconciler: stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Device, RemotePlaybackState, Track, TrackSummary};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a scripted sequence of fetch results; repeats the last one.
    struct ScriptedRemote {
        script: Mutex<VecDeque<Result<Option<RemotePlaybackState>, RemoteError>>>,
        fetches: Mutex<u32>,
    }

    impl ScriptedRemote {
        fn new(script: Vec<Result<Option<RemotePlaybackState>, RemoteError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fetches: Mutex::new(0),
            })
        }

        fn fetches(&self) -> u32 {
            *self.fetches.lock().unwrap()
        }
    }

    impl RemotePlayback for ScriptedRemote {
        async fn fetch_current_playback(&self) -> Result<Option<RemotePlaybackState>, RemoteError> {
            *self.fetches.lock().unwrap() += 1;
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap_or(Ok(None))
            }
        }

        async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<TrackSummary>, RemoteError> {
            Ok(Vec::new())
        }

        async fn play(&self, _uri: &str, _device_id: Option<&str>) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn pause(&self) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn resume(&self) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn skip_next(&self) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn skip_previous(&self) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn list_devices(&self) -> Result<Vec<Device>, RemoteError> {
            Ok(Vec::new())
        }
    }

    fn remote_state(id: &str, progress_ms: u64) -> RemotePlaybackState {
        RemotePlaybackState {
            track: Track {
                id: id.into(),
                name: id.into(),
                artist: "X".into(),
                uri: format!("spotify:track:{id}"),
                duration_ms: 200_000,
            },
            progress_ms,
            is_playing: true,
        }
    }

    #[tokio::test]
    async fn test_poll_reconciles_active_track() {
        let remote = ScriptedRemote::new(vec![Ok(Some(remote_state("A", 5_000)))]);
        let state = SharedPlaybackState::default();
        let reconciler = RemoteStateReconciler::new(remote, state.clone(), Duration::from_secs(5));

        assert_eq!(
            reconciler.poll_once().await,
            PollOutcome::Reconciled(Reconciled::TrackChanged)
        );
        let snap = state.get_snapshot().await;
        assert_eq!(snap.track_id(), Some("A"));
        assert_eq!(snap.progress_ms, 5_000);
    }

    #[tokio::test]
    async fn test_poll_without_track_leaves_state_untouched() {
        let remote = ScriptedRemote::new(vec![Ok(Some(remote_state("A", 5_000))), Ok(None)]);
        let state = SharedPlaybackState::default();
        let reconciler = RemoteStateReconciler::new(remote, state.clone(), Duration::from_secs(5));

        reconciler.poll_once().await;
        let before = state.get_snapshot().await;
        state.clear_refresh();

        assert_eq!(reconciler.poll_once().await, PollOutcome::NoActiveTrack);
        assert_eq!(state.get_snapshot().await, before);
        assert!(!state.refresh_signal().is_raised());
    }

    #[tokio::test]
    async fn test_failed_poll_leaves_state_untouched() {
        let remote = ScriptedRemote::new(vec![
            Ok(Some(remote_state("A", 5_000))),
            Err(RemoteError::Network("connection reset".into())),
        ]);
        let state = SharedPlaybackState::default();
        let reconciler = RemoteStateReconciler::new(remote, state.clone(), Duration::from_secs(5));

        reconciler.poll_once().await;
        let before = state.get_snapshot().await;

        let outcome = reconciler.poll_once().await;
        assert!(matches!(outcome, PollOutcome::Failed(RemoteError::Network(_))));
        assert_eq!(state.get_snapshot().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_period_and_stops_on_cancel() {
        let remote = ScriptedRemote::new(vec![Ok(Some(remote_state("A", 0)))]);
        let state = SharedPlaybackState::default();
        let reconciler =
            RemoteStateReconciler::new(remote.clone(), state.clone(), Duration::from_secs(5));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(reconciler.run(cancel.clone()));

        // Immediate first poll, then one at 5s and one at 10s.
        tokio::time::sleep(Duration::from_millis(12_000)).await;
        assert_eq!(remote.fetches(), 3);

        cancel.cancel();
        task.await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(remote.fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_polling_through_failures() {
        let remote = ScriptedRemote::new(vec![
            Err(RemoteError::Auth("token expired".into())),
            Err(RemoteError::RateLimited {
                retry_after_secs: Some(3),
            }),
            Ok(Some(remote_state("B", 1_000))),
        ]);
        let state = SharedPlaybackState::default();
        let reconciler =
            RemoteStateReconciler::new(remote.clone(), state.clone(), Duration::from_secs(5));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(reconciler.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(remote.fetches(), 3);
        assert_eq!(state.get_snapshot().await.track_id(), Some("B"));

        cancel.cancel();
        task.await.unwrap();
    }
}
