/// A track as the playback service describes it. `id` and `duration_ms`
/// always travel together so a snapshot can never hold one without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub uri: String,
    pub duration_ms: u64,
}

/// Authoritative playback state returned by a successful poll that has an
/// active track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePlaybackState {
    pub track: Track,
    pub progress_ms: u64,
    pub is_playing: bool,
}

/// One row of a search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

/// User-initiated transport commands, queued from the input path and sent in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Play { uri: String },
    Pause,
    Resume,
    SkipNext,
    SkipPrevious,
}

impl TransportCommand {
    /// Whether the command starts a different track, so progress is
    /// optimistically reset to zero once it has been issued.
    pub fn resets_progress(&self) -> bool {
        matches!(
            self,
            TransportCommand::Play { .. } | TransportCommand::SkipNext | TransportCommand::SkipPrevious
        )
    }
}
