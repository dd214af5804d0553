//! Stream client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default OverlayPlugin WebSocket endpoint exposed by IINACT.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:10501/ws";

/// Invalid stream configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The endpoint is not a plain WebSocket URL.
    #[error("endpoint must start with ws://, got {url:?}")]
    InvalidUrl { url: String },

    /// TLS endpoints need a transport built with TLS support.
    #[error("wss:// endpoints are not supported, got {url:?}")]
    TlsUnsupported { url: String },

    /// A zero backoff would hot-loop against an absent endpoint.
    #[error("reconnect backoff must be greater than zero")]
    ZeroBackoff,
}

/// Configuration for the [`StreamClient`](crate::StreamClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// WebSocket endpoint of the overlay plugin.
    #[serde(default = "default_url")]
    pub url: String,

    /// Delay between a lost connection and the next attempt.
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,

    /// Upper bound on a single connection attempt.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// How long `stop` waits for the background task before aborting it.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

const fn default_reconnect_backoff_ms() -> u64 {
    3_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

const fn default_stop_timeout_ms() -> u64 {
    3_000
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}

impl StreamConfig {
    pub const fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.starts_with("wss://") {
            return Err(ConfigError::TlsUnsupported {
                url: self.url.clone(),
            });
        }
        if !self.url.starts_with("ws://") {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
            });
        }
        if self.reconnect_backoff_ms == 0 {
            return Err(ConfigError::ZeroBackoff);
        }
        Ok(())
    }
}
