use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::protocol::{RemotePlaybackState, Track};
use crate::refresh::RefreshSignal;

pub const DEFAULT_DRIFT_THRESHOLD_MS: u64 = 2000;

/// What we believe is playing right now. Possibly stale relative to the
/// remote service.
///
/// The track id and its duration live together in `track`, so "no track"
/// is exactly "duration zero". `is_playing` is only ever set from a remote
/// state that carries a track.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub track: Option<Track>,
    pub progress_ms: u64,
    pub is_playing: bool,
    /// Last moment `progress_ms` was known to be accurate.
    pub last_synced_at: Instant,
}

/// How a remote poll was merged into the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// Different track (or first track); remote progress adopted.
    TrackChanged,
    /// Same track but drift exceeded the threshold; remote progress adopted.
    Resynced { drift_ms: u64 },
    /// Same track within the threshold; local progress kept.
    Kept { drift_ms: u64 },
}

impl PlaybackSnapshot {
    pub fn empty(now: Instant) -> Self {
        Self {
            track: None,
            progress_ms: 0,
            is_playing: false,
            last_synced_at: now,
        }
    }

    pub fn track_id(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.id.as_str())
    }

    pub fn duration_ms(&self) -> u64 {
        self.track.as_ref().map_or(0, |t| t.duration_ms)
    }

    fn clamp_progress(&mut self) {
        self.progress_ms = self.progress_ms.min(self.duration_ms());
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.progress_ms <= self.duration_ms(),
            "progress {} beyond duration {}",
            self.progress_ms,
            self.duration_ms()
        );
        debug_assert!(
            self.track.is_some() || !self.is_playing,
            "playing without a track"
        );
    }

    /// Advance the simulated clock. No-op while paused.
    pub fn advance(&mut self, elapsed_ms: u64, now: Instant) {
        if self.is_playing {
            self.progress_ms = self.progress_ms.saturating_add(elapsed_ms);
            self.clamp_progress();
        }
        self.last_synced_at = now;
        self.check_invariants();
    }

    /// Merge authoritative remote state. Progress is adopted only on a track
    /// change or when drift exceeds `drift_threshold_ms`; identity, duration
    /// and play state are always taken from the remote.
    pub fn reconcile(
        &mut self,
        remote: RemotePlaybackState,
        observed_at: Instant,
        drift_threshold_ms: u64,
    ) -> Reconciled {
        let drift_ms = self.progress_ms.abs_diff(remote.progress_ms);
        let outcome = if self.track_id() != Some(remote.track.id.as_str()) {
            Reconciled::TrackChanged
        } else if drift_ms > drift_threshold_ms {
            Reconciled::Resynced { drift_ms }
        } else {
            Reconciled::Kept { drift_ms }
        };

        self.track = Some(remote.track);
        self.is_playing = remote.is_playing;
        if !matches!(outcome, Reconciled::Kept { .. }) {
            self.progress_ms = remote.progress_ms;
            self.last_synced_at = observed_at;
        }
        // A shorter duration for the same track can leave kept progress past the end.
        self.clamp_progress();
        self.check_invariants();
        outcome
    }

    /// Optimistic reset right after a play/skip command was issued.
    pub fn reset(&mut self, observed_at: Instant) {
        self.progress_ms = 0;
        self.last_synced_at = observed_at;
        self.check_invariants();
    }
}

/// The snapshot shared between the clock ticker, the remote reconciler and
/// the render loop. Every mutation takes the write lock for exactly one
/// read-modify-write and then raises the refresh signal.
#[derive(Debug, Clone)]
pub struct SharedPlaybackState {
    snapshot: Arc<RwLock<PlaybackSnapshot>>,
    refresh: RefreshSignal,
    drift_threshold_ms: u64,
}

impl SharedPlaybackState {
    pub fn new(drift_threshold_ms: u64) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(PlaybackSnapshot::empty(Instant::now()))),
            refresh: RefreshSignal::new(),
            drift_threshold_ms,
        }
    }

    /// Read-only copy of the whole snapshot.
    pub async fn get_snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.read().await.clone()
    }

    pub fn refresh_signal(&self) -> &RefreshSignal {
        &self.refresh
    }

    pub async fn wait_for_refresh(&self, timeout: Duration) -> bool {
        self.refresh.wait(timeout).await
    }

    pub fn clear_refresh(&self) {
        self.refresh.clear();
    }

    pub async fn tick_local_clock(&self, elapsed_ms: u64) {
        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.advance(elapsed_ms, Instant::now());
        }
        self.refresh.raise();
    }

    /// Advance by the wall-clock time since `last_synced_at`, measured under
    /// the lock so time already covered by a remote resync is not counted twice.
    pub async fn tick_to(&self, now: Instant) {
        {
            let mut snapshot = self.snapshot.write().await;
            let elapsed = now.saturating_duration_since(snapshot.last_synced_at);
            snapshot.advance(elapsed.as_millis() as u64, now);
        }
        self.refresh.raise();
    }

    pub async fn reconcile_from_remote(
        &self,
        remote: RemotePlaybackState,
        observed_at: Instant,
    ) -> Reconciled {
        let outcome = {
            let mut snapshot = self.snapshot.write().await;
            let previous = snapshot.track_id().map(str::to_owned);
            let outcome = snapshot.reconcile(remote, observed_at, self.drift_threshold_ms);
            match outcome {
                Reconciled::TrackChanged => info!(
                    "state: track {:?} → {:?} at {}ms",
                    previous,
                    snapshot.track_id(),
                    snapshot.progress_ms
                ),
                Reconciled::Resynced { drift_ms } => {
                    debug!("state: resynced after {}ms drift", drift_ms)
                }
                Reconciled::Kept { .. } => {}
            }
            outcome
        };
        self.refresh.raise();
        outcome
    }

    pub async fn reset_for_new_playback(&self, observed_at: Instant) {
        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.reset(observed_at);
        }
        self.refresh.raise();
    }
}

impl Default for SharedPlaybackState {
    fn default() -> Self {
        Self::new(DEFAULT_DRIFT_THRESHOLD_MS)
    }
}
