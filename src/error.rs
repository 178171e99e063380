use std::path::PathBuf;

use crate::core::EngineError;

/// Errors that can occur when loading host configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("invalid environment variable {name}={value}")]
    BadEnv { name: &'static str, value: String },

    #[error("config validation error: {0}")]
    Validation(#[from] EngineError),
}
