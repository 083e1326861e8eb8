mod action;
mod app;
mod app_state;
mod component;
mod components;
mod intent;
mod spotify;
mod theme;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use spot_core::config::{Config, ConfigError};
use spot_core::platform;
use spot_core::session::PlaybackSession;

use crate::spotify::{Authenticator, SpotifyClient};

/// Control Spotify playback from the terminal.
#[derive(Parser, Debug)]
#[command(name = "spot", version, about)]
struct Args {
    /// Path to config.toml (default: the platform config dir)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Forget the cached login and authorize again
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    let log_path = platform::log_path();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("spot log: {}", log_path.display());
    tracing::info!("spot starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config_path = args.config.unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(ConfigError::TemplateWritten(path)) => {
            anyhow::bail!(
                "wrote a config template to {}; add your client_id and client_secret under [auth] and run again",
                path.display()
            );
        }
        Err(e) => Err(e).context("Failed to load config")?,
    };

    // ── Login ────────────────────────────────────────────────────────────────
    let token_path = platform::token_cache_path();
    if args.logout && token_path.exists() {
        std::fs::remove_file(&token_path)
            .with_context(|| format!("Failed to remove {}", token_path.display()))?;
        tracing::info!("auth: cached token removed");
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("spot/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let auth = Authenticator::new(http.clone(), config.auth.clone(), token_path);
    let token = auth.obtain_token().await.context("Login failed")?;

    // ── Session + UI ─────────────────────────────────────────────────────────
    let remote = Arc::new(SpotifyClient::new(http, auth, token));
    let session = PlaybackSession::start(remote, &config.sync);

    let result = app::App::new(&config).run(&session).await;
    session.shutdown().await;
    tracing::info!("spot stopped");
    result
}
