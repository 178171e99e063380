//! Host configuration
//!
//! Layering, lowest priority first: built-in defaults, an optional TOML file,
//! `MATCH3_*` environment variables, then command-line flags (applied by the
//! binary).

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::EngineConfig;
use crate::error::ConfigError;
use crate::types::TICK_MS;

/// Settings for the headless runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Delay between engine steps; 0 runs as fast as possible
    pub tick_ms: u64,
    /// Swaps to play before stopping
    pub max_moves: u32,
    /// Engine steps allowed to resolve a single swap
    pub max_cascade: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS as u64,
            max_moves: 100,
            max_cascade: 10_000,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: EngineConfig,
    pub host: HostConfig,
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, or the given file when one is named.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `MATCH3_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply `MATCH3_*` overrides read through `lookup`.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = parse_var(&lookup, "MATCH3_WIDTH")? {
            self.board.width = v;
        }
        if let Some(v) = parse_var(&lookup, "MATCH3_HEIGHT")? {
            self.board.height = v;
        }
        if let Some(v) = parse_var(&lookup, "MATCH3_PALETTE")? {
            self.board.palette_size = v;
        }
        if let Some(v) = parse_var(&lookup, "MATCH3_SEED")? {
            self.board.rng_seed = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "MATCH3_TICK_MS")? {
            self.host.tick_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "MATCH3_MAX_MOVES")? {
            self.host.max_moves = v;
        }
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| ConfigError::BadEnv {
        name,
        value: raw.to_string(),
    })
}
