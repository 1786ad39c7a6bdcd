//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Relay binding address, `0.0.0.0:<PORT>`.
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Directory the host and controller pages are served from.
    pub static_dir: PathBuf,
    /// Relay websocket endpoint the host binary connects to.
    pub relay_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let server_addr = format!("0.0.0.0:{port}")
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port))?;

        Ok(Self {
            server_addr,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "public".to_string())
                .into(),
            relay_url: env::var("RELAY_URL")
                .unwrap_or_else(|_| "ws://127.0.0.1:3000/ws".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}
