//! Local playback clock: keeps the progress bar moving between remote polls.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::state::SharedPlaybackState;

pub struct LocalClockTicker {
    state: SharedPlaybackState,
    period: Duration,
}

impl LocalClockTicker {
    pub fn new(state: SharedPlaybackState, period: Duration) -> Self {
        Self { state, period }
    }

    /// Tick every `period` until cancelled. Each run advances by the measured
    /// elapsed time, not the nominal period, so scheduling jitter and stalls
    /// are absorbed. Never fails.
    pub async fn run(self, cancel: CancellationToken) {
        debug!("clock ticker: started, period={:?}", self.period);
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.state.tick_to(Instant::now()).await;
                }
            }
        }
        debug!("clock ticker: stopped");
    }
}
