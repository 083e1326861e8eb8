use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use super::platform;

/// Startup-only configuration failures. Never raised once the session runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config found; wrote a template to {0}, fill in client_id and client_secret")]
    TemplateWritten(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("missing credential `{0}` in [auth]")]
    MissingCredential(&'static str),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// OAuth application credentials for the remote playback service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

/// Timing of the background loops and the render wait.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Local/remote progress difference above which the remote value wins.
    #[serde(default = "default_drift_threshold_ms")]
    pub drift_threshold_ms: u64,
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThemeConfig {
    #[serde(default)]
    pub use_default_terminal_theme: bool,
    #[serde(default)]
    pub custom_colors: CustomColors,
}

/// Color names per UI role. Unknown names fall back to the role default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomColors {
    #[serde(default = "default_title_color")]
    pub title: String,
    #[serde(default = "default_controls_color")]
    pub controls: String,
    #[serde(default = "default_selection_color")]
    pub selection: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            drift_threshold_ms: default_drift_threshold_ms(),
            render_timeout_ms: default_render_timeout_ms(),
            search_limit: default_search_limit(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            use_default_terminal_theme: false,
            custom_colors: CustomColors::default(),
        }
    }
}

impl Default for CustomColors {
    fn default() -> Self {
        Self {
            title: default_title_color(),
            controls: default_controls_color(),
            selection: default_selection_color(),
        }
    }
}

impl SyncConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms.max(1))
    }
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:8888/callback".to_string()
}

fn default_scope() -> String {
    "user-read-playback-state user-modify-playback-state".to_string()
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_drift_threshold_ms() -> u64 {
    2000
}

fn default_render_timeout_ms() -> u64 {
    100
}

fn default_search_limit() -> u32 {
    10
}

fn default_title_color() -> String {
    "green".to_string()
}

fn default_controls_color() -> String {
    "cyan".to_string()
}

fn default_selection_color() -> String {
    "yellow".to_string()
}

/// On-disk shape. `theme` is optional so a missing section can be detected
/// and written back with defaults.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    auth: AuthConfig,
    #[serde(default)]
    sync: SyncConfig,
    theme: Option<ThemeConfig>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load `path`, applying theme defaults (written back once) and checking
    /// that credentials are present.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::default().save_to(path)?;
            return Err(ConfigError::TemplateWritten(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let theme_missing = file.theme.is_none();
        let config = Self {
            auth: file.auth,
            sync: file.sync,
            theme: file.theme.unwrap_or_default(),
        };
        if theme_missing {
            info!("config: adding default [theme] to {}", path.display());
            config.save_to(path)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.client_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("client_id"));
        }
        if self.auth.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingCredential("client_secret"));
        }
        Ok(())
    }
}
