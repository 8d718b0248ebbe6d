//! Environment-driven configuration

use std::path::PathBuf;

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote task API
    pub api_url: String,
    /// Directory holding the token slot and the log file
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let api_url = std::env::var("TD_API_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| api_client::DEFAULT_BASE_URL.to_string());

        let data_dir = std::env::var("TD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".taskdeck"));

        Self { api_url, data_dir }
    }

    /// Durable slot holding the raw session token
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("token")
    }
}
