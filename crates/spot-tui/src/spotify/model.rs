//! Web API response shapes and their mapping onto the core's types.

use serde::Deserialize;

use spot_core::protocol::{Device, RemotePlaybackState, Track, TrackSummary};

/// `GET /v1/me/player`
#[derive(Debug, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub item: Option<PlayableItem>,
}

/// A track or an episode. Episodes carry no `artists`; local files have no `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayableItem {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub show: Option<Show>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Show {
    pub name: String,
}

/// `GET /v1/search?type=track`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<PlayableItem>>,
}

#[derive(Debug, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// `GET /v1/me/player/devices`
#[derive(Debug, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<ApiDevice>,
}

#[derive(Debug, Deserialize)]
pub struct ApiDevice {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_restricted: bool,
}

/// `{"error": {"status": 404, "message": "...", "reason": "NO_ACTIVE_DEVICE"}}`
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    pub reason: Option<String>,
}

impl PlayableItem {
    fn artist_name(&self) -> String {
        match (self.artists.first(), &self.show) {
            (Some(artist), _) => artist.name.clone(),
            (None, Some(show)) => show.name.clone(),
            (None, None) => String::new(),
        }
    }

    fn stable_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.uri.clone())
    }

    pub fn into_track(self) -> Track {
        Track {
            id: self.stable_id(),
            artist: self.artist_name(),
            name: self.name,
            uri: self.uri,
            duration_ms: self.duration_ms,
        }
    }

    pub fn into_summary(self) -> TrackSummary {
        TrackSummary {
            id: self.stable_id(),
            artist: self.artist_name(),
            name: self.name,
            uri: self.uri,
        }
    }
}

impl CurrentlyPlaying {
    /// `None` when nothing is loaded (ads and gaps between tracks report no item).
    /// An item without a duration cannot be ticked and counts as nothing loaded.
    pub fn into_remote_state(self) -> Option<RemotePlaybackState> {
        let item = self.item.filter(|item| item.duration_ms > 0)?;
        Some(RemotePlaybackState {
            track: item.into_track(),
            progress_ms: self.progress_ms.unwrap_or(0),
            is_playing: self.is_playing,
        })
    }
}

impl DevicesResponse {
    /// Devices that can be targeted; restricted and id-less devices are dropped.
    pub fn into_devices(self) -> Vec<Device> {
        self.devices
            .into_iter()
            .filter(|d| !d.is_restricted)
            .filter_map(|d| {
                Some(Device {
                    id: d.id?,
                    name: d.name,
                    is_active: d.is_active,
                })
            })
            .collect()
    }
}
