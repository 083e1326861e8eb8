//! PlaybackSession — owns the background loops for one remote session.
//!
//! `start` spawns the local clock ticker, the remote reconciler and the
//! transport worker on the current tokio runtime. `shutdown` cancels the two
//! loops, lets the worker finish what is queued, and joins all three. The
//! render loop only talks to the session through `state()` and `submit()`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::protocol::{TrackSummary, TransportCommand};
use crate::reconciler::RemoteStateReconciler;
use crate::remote::{RemoteError, RemotePlayback};
use crate::state::SharedPlaybackState;
use crate::ticker::LocalClockTicker;
use crate::transport::TransportController;

/// Search the remote catalogue. A blank query returns nothing without a
/// remote call.
pub async fn search_tracks<R: RemotePlayback>(
    remote: &R,
    query: &str,
    limit: u32,
) -> Result<Vec<TrackSummary>, RemoteError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    remote.search(query, limit).await
}

pub struct PlaybackSession<R> {
    remote: Arc<R>,
    state: SharedPlaybackState,
    commands: mpsc::UnboundedSender<TransportCommand>,
    cancel: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl<R: RemotePlayback> PlaybackSession<R> {
    pub fn start(remote: Arc<R>, sync: &SyncConfig) -> Self {
        let state = SharedPlaybackState::new(sync.drift_threshold_ms);
        let cancel = CancellationToken::new();

        let ticker = LocalClockTicker::new(state.clone(), sync.tick_interval());
        let reconciler =
            RemoteStateReconciler::new(Arc::clone(&remote), state.clone(), sync.poll_interval());

        let transport = TransportController::new(Arc::clone(&remote), state.clone());
        let (commands, queue) = mpsc::unbounded_channel();

        let tasks = vec![
            ("clock ticker", tokio::spawn(ticker.run(cancel.child_token()))),
            ("reconciler", tokio::spawn(reconciler.run(cancel.child_token()))),
            ("transport", tokio::spawn(transport.run(queue))),
        ];
        info!(
            "session: started (tick={:?}, poll={:?}, drift={}ms)",
            sync.tick_interval(),
            sync.poll_interval(),
            sync.drift_threshold_ms
        );

        Self {
            remote,
            state,
            commands,
            cancel,
            tasks,
        }
    }

    pub fn state(&self) -> &SharedPlaybackState {
        &self.state
    }

    /// Queue a transport command. Returns immediately; commands reach the
    /// remote in submission order.
    pub fn submit(&self, cmd: TransportCommand) {
        if let Err(e) = self.commands.send(cmd) {
            warn!("session: transport worker gone, dropping {:?}", e.0);
        }
    }

    pub fn remote(&self) -> Arc<R> {
        Arc::clone(&self.remote)
    }

    /// Cancel the background loops and wait for them to finish. Commands
    /// already submitted are still sent before this returns.
    pub async fn shutdown(self) {
        let Self {
            commands,
            cancel,
            tasks,
            ..
        } = self;
        drop(commands);
        cancel.cancel();
        for (name, task) in tasks {
            if let Err(e) = task.await {
                warn!("session: {} ended abnormally: {}", name, e);
            }
        }
        info!("session: stopped");
    }
}
