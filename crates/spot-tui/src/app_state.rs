//! AppState — read-only view handed to components while drawing.
//!
//! Rebuilt by the App after each wake from the latest playback snapshot.

use spot_core::state::PlaybackSnapshot;
use tokio::time::Instant;

use crate::intent::RenderHint;
use crate::theme::Palette;

#[derive(Debug, Clone)]
pub struct AppState {
    pub snapshot: PlaybackSnapshot,
    /// Play state to display: the pending intent if there is one.
    pub shown_playing: bool,
    pub pause_hint: RenderHint,
    pub palette: Palette,
}

impl AppState {
    pub fn new(palette: Palette) -> Self {
        Self {
            snapshot: PlaybackSnapshot::empty(Instant::now()),
            shown_playing: false,
            pause_hint: RenderHint::Normal,
            palette,
        }
    }
}
