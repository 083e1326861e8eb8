//! User-initiated transport commands.
//!
//! Commands are best-effort: the remote call is made, a failure is logged
//! and swallowed, and play/skip are followed by an optimistic progress reset
//! so the UI does not wait for the next poll to reflect the action.
//!
//! The input path only enqueues. A single worker drains the queue, so the
//! remote sees commands in the order they were issued.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::protocol::{Device, TransportCommand};
use crate::remote::{RemoteError, RemotePlayback};
use crate::state::SharedPlaybackState;

/// The active device if there is one, else the first listed.
pub fn select_device(devices: &[Device]) -> Option<&Device> {
    devices.iter().find(|d| d.is_active).or_else(|| devices.first())
}

pub struct TransportController<R> {
    remote: Arc<R>,
    state: SharedPlaybackState,
}

impl<R: RemotePlayback> TransportController<R> {
    pub fn new(remote: Arc<R>, state: SharedPlaybackState) -> Self {
        Self { remote, state }
    }

    /// Execute queued commands one at a time until every sender is dropped.
    /// Commands still queued at that point are executed before returning.
    pub async fn run(self, mut commands: mpsc::UnboundedReceiver<TransportCommand>) {
        debug!("transport: worker started");
        while let Some(cmd) = commands.recv().await {
            let _ = self.execute(cmd).await;
        }
        debug!("transport: worker stopped");
    }

    /// Issue `cmd` and apply the optimistic update. Returns the remote
    /// outcome for callers that care; the core itself ignores it.
    pub async fn execute(&self, cmd: TransportCommand) -> Result<(), RemoteError> {
        info!("transport: {:?}", cmd);
        let result = match &cmd {
            TransportCommand::Play { uri } => {
                let device_id = self.active_device_id().await;
                self.remote.play(uri, device_id.as_deref()).await
            }
            TransportCommand::Pause => self.remote.pause().await,
            TransportCommand::Resume => self.remote.resume().await,
            TransportCommand::SkipNext => self.remote.skip_next().await,
            TransportCommand::SkipPrevious => self.remote.skip_previous().await,
        };

        if let Err(e) = &result {
            warn!("transport: {:?} failed: {}", cmd, e);
        }
        if cmd.resets_progress() {
            self.state.reset_for_new_playback(Instant::now()).await;
        }
        result
    }

    async fn active_device_id(&self) -> Option<String> {
        match self.remote.list_devices().await {
            Ok(devices) => {
                let device = select_device(&devices);
                debug!("transport: target device {:?}", device.map(|d| &d.name));
                device.map(|d| d.id.clone())
            }
            Err(e) => {
                warn!("transport: listing devices failed: {}", e);
                None
            }
        }
    }
}
