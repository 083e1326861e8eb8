use std::path::PathBuf;

const APP_DIR: &str = "spot";

/// Token cache and log file. `~/.local/share/spot` on unix.
pub fn data_dir() -> PathBuf {
    let base = if cfg!(unix) {
        dirs::home_dir().map(|home| home.join(".local").join("share"))
    } else {
        dirs::data_local_dir()
    };
    base.unwrap_or_else(std::env::temp_dir).join(APP_DIR)
}

/// Holds `config.toml`. `~/.config/spot` on unix.
pub fn config_dir() -> PathBuf {
    let base = if cfg!(unix) {
        dirs::home_dir().map(|home| home.join(".config"))
    } else {
        dirs::config_dir()
    };
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

/// Where the OAuth token cache lives.
pub fn token_cache_path() -> PathBuf {
    data_dir().join("token.json")
}

pub fn log_path() -> PathBuf {
    data_dir().join("spot.log")
}
