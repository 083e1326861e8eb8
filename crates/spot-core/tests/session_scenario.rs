//! End-to-end runs of a `PlaybackSession` against a scripted remote, with
//! tokio time paused so every period is deterministic.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{playing, summary, FakeRemote};
use spot_core::config::SyncConfig;
use spot_core::protocol::TransportCommand;
use spot_core::remote::RemoteError;
use spot_core::session::{search_tracks, PlaybackSession};

fn sync(tick_interval_ms: u64) -> SyncConfig {
    SyncConfig {
        tick_interval_ms,
        ..SyncConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn three_failed_polls_leave_snapshot_untouched() {
    let remote = Arc::new(FakeRemote::with_script(vec![
        playing("A", 200_000, 10_000),
        Err(RemoteError::Network("dns failure".into())),
        Err(RemoteError::Auth("token revoked".into())),
        Err(RemoteError::RateLimited {
            retry_after_secs: None,
        }),
        playing("A", 200_000, 27_000),
    ]));
    // Ticker effectively idle so only the reconciler touches the snapshot.
    let session = PlaybackSession::start(remote.clone(), &sync(3_600_000));

    tokio::time::sleep(Duration::from_secs(1)).await;
    let before = session.state().get_snapshot().await;
    assert_eq!(before.track_id(), Some("A"));
    assert_eq!(before.progress_ms, 10_000);

    // Polls at 5s, 10s and 15s all fail.
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(remote.fetch_count(), 4);
    assert_eq!(session.state().get_snapshot().await, before);

    // The next successful poll resyncs (17s drift).
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(remote.fetch_count(), 5);
    assert_eq!(session.state().get_snapshot().await.progress_ms, 27_000);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn local_clock_runs_between_polls() {
    let remote = Arc::new(FakeRemote::with_script(vec![
        playing("A", 200_000, 10_000),
        // Remote agrees with the local clock within the drift threshold.
        playing("A", 200_000, 15_400),
    ]));
    let session = PlaybackSession::start(remote.clone(), &sync(1_000));

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let progress = session.state().get_snapshot().await.progress_ms;
    assert!((13_000..13_010).contains(&progress), "progress {progress}");

    // At 5s the poll reports 15.4s against a local 15s: kept, no jump.
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    let progress = session.state().get_snapshot().await.progress_ms;
    assert!((15_000..15_010).contains(&progress), "progress {progress}");

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn skip_resets_progress_until_next_poll() {
    let remote = Arc::new(FakeRemote::with_script(vec![
        playing("A", 200_000, 60_000),
        playing("B", 180_000, 2_000),
    ]));
    let session = PlaybackSession::start(remote.clone(), &sync(3_600_000));

    tokio::time::sleep(Duration::from_millis(100)).await;
    session.submit(TransportCommand::SkipNext);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snap = session.state().get_snapshot().await;
    assert_eq!(snap.progress_ms, 0);
    assert_eq!(snap.track_id(), Some("A"));
    assert!(remote.calls().contains(&"next".to_string()));

    tokio::time::sleep(Duration::from_secs(5)).await;
    let snap = session.state().get_snapshot().await;
    assert_eq!(snap.track_id(), Some("B"));
    assert_eq!(snap.progress_ms, 2_000);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn render_wait_wakes_on_state_change() {
    let remote = Arc::new(FakeRemote::with_script(vec![playing("A", 200_000, 0)]));
    let session = PlaybackSession::start(remote, &sync(1_000));
    let state = session.state().clone();

    // First wake comes from the startup tick/poll.
    assert!(state.wait_for_refresh(Duration::from_millis(100)).await);
    state.clear_refresh();

    // Nothing changes for the next 100ms window.
    tokio::time::sleep(Duration::from_millis(10)).await;
    state.clear_refresh();
    assert!(!state.wait_for_refresh(Duration::from_millis(100)).await);

    // The next 1s tick raises it again.
    assert!(state.wait_for_refresh(Duration::from_secs(2)).await);

    session.shutdown().await;
}

#[tokio::test]
async fn search_skips_blank_queries() {
    let remote = Arc::new(FakeRemote::with_catalogue(vec![
        summary("1", "Blue Monday"),
        summary("2", "Blue in Green"),
    ]));

    assert!(search_tracks(remote.as_ref(), "   ", 10).await.unwrap().is_empty());
    assert!(!remote.calls().iter().any(|c| c.starts_with("search")));

    let hits = search_tracks(remote.as_ref(), " blue ", 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Blue Monday");
    assert!(remote.calls().contains(&"search blue".to_string()));
}

#[tokio::test(start_paused = true)]
async fn commands_reach_remote_in_submission_order() {
    let remote = Arc::new(FakeRemote::with_slow_pause(Duration::from_millis(200)));
    let session = PlaybackSession::start(remote.clone(), &sync(3_600_000));

    session.submit(TransportCommand::Pause);
    session.submit(TransportCommand::Resume);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(remote.transport_calls(), vec!["pause", "resume"]);
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_finishes_queued_commands() {
    let remote = Arc::new(FakeRemote::with_slow_pause(Duration::from_millis(200)));
    let session = PlaybackSession::start(remote.clone(), &sync(3_600_000));

    session.submit(TransportCommand::Pause);
    session.submit(TransportCommand::SkipNext);
    session.shutdown().await;

    assert_eq!(remote.transport_calls(), vec!["pause", "next"]);
}
