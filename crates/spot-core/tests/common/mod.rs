//! Scripted in-memory stand-in for the remote playback service.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use spot_core::protocol::{Device, RemotePlaybackState, Track, TrackSummary};
use spot_core::remote::{RemoteError, RemotePlayback};

pub type FetchResult = Result<Option<RemotePlaybackState>, RemoteError>;

#[derive(Default)]
pub struct FakeRemote {
    fetch_script: Mutex<VecDeque<FetchResult>>,
    calls: Mutex<Vec<String>>,
    devices: Vec<Device>,
    catalogue: Vec<TrackSummary>,
    pause_delay: Duration,
}

impl FakeRemote {
    /// Each fetch pops the next scripted result; the last one repeats.
    pub fn with_script(script: Vec<FetchResult>) -> Self {
        Self {
            fetch_script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn with_catalogue(catalogue: Vec<TrackSummary>) -> Self {
        Self {
            catalogue,
            ..Default::default()
        }
    }

    /// `pause` takes `delay` to complete, so a later command could overtake it.
    pub fn with_slow_pause(delay: Duration) -> Self {
        Self {
            pause_delay: delay,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls().iter().filter(|c| *c == "fetch").count()
    }

    /// Recorded calls other than fetches.
    pub fn transport_calls(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| c != "fetch").collect()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl RemotePlayback for FakeRemote {
    async fn fetch_current_playback(&self) -> FetchResult {
        self.record("fetch");
        let mut script = self.fetch_script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap_or(Ok(None))
        } else {
            script.front().cloned().unwrap_or(Ok(None))
        }
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<TrackSummary>, RemoteError> {
        self.record(format!("search {query}"));
        let needle = query.to_lowercase();
        Ok(self
            .catalogue
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn play(&self, uri: &str, device_id: Option<&str>) -> Result<(), RemoteError> {
        self.record(format!("play {uri} {}", device_id.unwrap_or("-")));
        Ok(())
    }

    async fn pause(&self) -> Result<(), RemoteError> {
        tokio::time::sleep(self.pause_delay).await;
        self.record("pause");
        Ok(())
    }

    async fn resume(&self) -> Result<(), RemoteError> {
        self.record("resume");
        Ok(())
    }

    async fn skip_next(&self) -> Result<(), RemoteError> {
        self.record("next");
        Ok(())
    }

    async fn skip_previous(&self) -> Result<(), RemoteError> {
        self.record("previous");
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<Device>, RemoteError> {
        Ok(self.devices.clone())
    }
}

pub fn playing(id: &str, duration_ms: u64, progress_ms: u64) -> FetchResult {
    Ok(Some(RemotePlaybackState {
        track: Track {
            id: id.to_string(),
            name: format!("Track {id}"),
            artist: "Someone".to_string(),
            uri: format!("spotify:track:{id}"),
            duration_ms,
        },
        progress_ms,
        is_playing: true,
    }))
}

pub fn summary(id: &str, name: &str) -> TrackSummary {
    TrackSummary {
        id: id.to_string(),
        name: name.to_string(),
        artist: "Someone".to_string(),
        uri: format!("spotify:track:{id}"),
    }
}
