//! Configuration management for mesad.
//!
//! Loads settings from /etc/mesa/config.toml or uses defaults.
//! v0.2: SLA targets became configurable per priority.

use anyhow::Result;
use mesa_core::SlaTargets;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/mesa/config.toml";

/// Fallback config file path
pub const FALLBACK_CONFIG_PATH: &str = "/var/lib/mesa/config.toml";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7787".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Ticket store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "/var/lib/mesa/tickets.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Resolution targets per priority, in hours
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    #[serde(default = "default_critical_hours")]
    pub critical_hours: f64,

    #[serde(default = "default_high_hours")]
    pub high_hours: f64,

    #[serde(default = "default_medium_hours")]
    pub medium_hours: f64,

    #[serde(default = "default_low_hours")]
    pub low_hours: f64,
}

fn default_critical_hours() -> f64 {
    4.0
}

fn default_high_hours() -> f64 {
    8.0
}

fn default_medium_hours() -> f64 {
    24.0
}

fn default_low_hours() -> f64 {
    72.0
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            critical_hours: default_critical_hours(),
            high_hours: default_high_hours(),
            medium_hours: default_medium_hours(),
            low_hours: default_low_hours(),
        }
    }
}

impl SlaConfig {
    /// Convert to the targets the metrics engine consumes
    pub fn to_targets(&self) -> SlaTargets {
        SlaTargets {
            critical_hours: self.critical_hours,
            high_hours: self.high_hours,
            medium_hours: self.medium_hours,
            low_hours: self.low_hours,
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub sla: SlaConfig,
}

impl Config {
    /// Load config from file, or return defaults
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(FALLBACK_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }
}
