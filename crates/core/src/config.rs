//! Engine configuration
//!
//! Board dimensions and palette size are the only inputs the engine needs.
//! A missing seed means "seed from OS entropy" at construction time.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{
    DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_DIMENSION, MIN_DIMENSION, MIN_PALETTE_SIZE, PALETTE_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: u8,
    pub height: u8,
    pub palette_size: u8,
    pub rng_seed: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            palette_size: PALETTE_SIZE,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_palette_size(mut self, palette_size: u8) -> Self {
        self.palette_size = palette_size;
        self
    }

    /// Check dimension and palette limits.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
                return Err(EngineError::invalid(format!(
                    "{} must be within {}..={}, got {}",
                    name, MIN_DIMENSION, MAX_DIMENSION, value
                )));
            }
        }
        if !(MIN_PALETTE_SIZE..=PALETTE_SIZE).contains(&self.palette_size) {
            return Err(EngineError::invalid(format!(
                "palette_size must be within {}..={}, got {}",
                MIN_PALETTE_SIZE, PALETTE_SIZE, self.palette_size
            )));
        }
        Ok(())
    }
}
