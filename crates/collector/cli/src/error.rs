//! CLI error types

use collector_crypto::CryptoError;
use collector_types::{CollectorError, HexError};
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Collector(#[from] CollectorError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Encoding error: {0}")]
    Hex(#[from] HexError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
