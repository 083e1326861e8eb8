//! Playback-state reconciliation core for the `spot` terminal remote.
//!
//! The core keeps a locally simulated playback clock in step with an
//! intermittently polled remote playback session. It has no terminal or
//! network dependency: the remote service is reached through the
//! [`remote::RemotePlayback`] trait and the display layer only sees
//! [`state::SharedPlaybackState`] and [`transport::TransportController`].

pub mod config;
pub mod platform;
pub mod protocol;
pub mod reconciler;
pub mod refresh;
pub mod remote;
pub mod session;
pub mod state;
pub mod ticker;
pub mod transport;
