//! RNG module - deterministic color generation
//!
//! Every piece color is drawn independently and uniformly from the first
//! `palette_size` colors of the palette. The generator is a small LCG so that
//! the same seed always produces the same boards (replays, tests, benches).

use crate::types::{Color, PALETTE_SIZE};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales by the high bits; the low bits of a power-of-two LCG have a
    /// very short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

/// Source of random piece colors for one board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSource {
    rng: SimpleRng,
    palette_size: u8,
    seed: u32,
}

impl ColorSource {
    /// Create a color source with an explicit seed
    ///
    /// `palette_size` is clamped to the full palette.
    pub fn new(seed: u32, palette_size: u8) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            palette_size: palette_size.clamp(1, PALETTE_SIZE),
            seed,
        }
    }

    /// Create a color source seeded from OS entropy
    pub fn from_entropy(palette_size: u8) -> Self {
        Self::new(rand::random::<u32>(), palette_size)
    }

    /// Draw the next color
    pub fn next_color(&mut self) -> Color {
        let index = self.rng.next_range(self.palette_size as u32) as usize;
        Color::ALL[index]
    }

    /// Seed this source was created with
    pub fn seed(&self) -> u32 {
        self.seed
    }
}
