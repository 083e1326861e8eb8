//! Spotify Web API adapter: login, token cache and the HTTP client.

pub mod auth;
pub mod client;
pub mod model;

pub use auth::Authenticator;
pub use client::SpotifyClient;
