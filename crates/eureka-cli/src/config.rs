//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::Context;
use eureka_core::TrackedNames;
use eureka_feed::StreamConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Event feed endpoint and retry timing.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Ability and buff names to track.
    #[serde(default)]
    pub tracking: TrackedNames,

    /// Terminal output options.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Terminal output options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Colour the proc rate green at 50% or more, red below.
    #[serde(default)]
    pub color: bool,
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (EUREKA_*, `__` separates sections)
        figment = figment.merge(Env::prefixed("EUREKA_").split("__"));

        figment.extract()
    }

    /// Rejects settings the tracker cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.stream.validate().context("invalid [stream] configuration")?;
        self.tracking
            .validate()
            .context("invalid [tracking] configuration")?;
        Ok(())
    }
}

/// Returns the platform-specific config directory for eureka.
///
/// On Linux: `~/.config/eureka`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("eureka"))
}
