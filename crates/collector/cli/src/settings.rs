//! Layered CLI configuration
//!
//! Built-in defaults, then an optional file, then `COLLECTOR__*`
//! environment variables (`__` separates nested keys, e.g.
//! `COLLECTOR__ENGINE__CHAIN_ID=5`).

use collector_types::{Address, CollectorConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the CLI needs to know
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Engine parameters
    #[serde(default)]
    pub engine: CollectorConfig,

    /// Address the engine is deployed at; part of the ballot signing domain
    #[serde(default = "default_engine_address")]
    pub engine_address: Address,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            engine: CollectorConfig::default(),
            engine_address: default_engine_address(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_engine_address() -> Address {
    Address([0xc0; 20])
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CliConfig {
    /// Load configuration, layering `path` (if any) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("COLLECTOR")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
