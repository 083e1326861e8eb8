//! Action enum — everything a key press can ask the App to do.

use spot_core::protocol::TrackSummary;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    /// Pause or resume depending on the believed play state.
    TogglePause,
    Next,
    Prev,
    PlayTrack(TrackSummary),

    // ── Search ───────────────────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    SubmitSearch(String),

    // ── App ──────────────────────────────────────────────────────────────────
    Quit,
}
