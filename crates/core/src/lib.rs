//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the match-3 rules and the resolution state machine. It
//! has no dependency on rendering, timing or I/O; a host drives it by calling
//! [`Engine::advance`] once per tick and animating the returned events.
//!
//! # Module Structure
//!
//! - [`grid`]: piece storage, run detection, gravity, refill and move probing
//! - [`engine`]: phase machine (`Matching -> Clearing -> Dropping -> Refilling`)
//! - [`rng`]: seeded LCG color source
//! - [`scoring`]: points per cleared piece
//! - [`snapshot`]: render-friendly copy of the board
//!
//! # Rules
//!
//! - A run is three or more equal colors in a row or column. Every triple
//!   adds one mark to each of its pieces, so a run of four marks its middle
//!   pieces twice and an intersection piece is marked by both directions.
//! - A swap is accepted only between orthogonal neighbours and only if it
//!   creates a run; otherwise the board is left untouched.
//! - Cleared pieces score `10 * mark_count` each.
//! - After every cascade the board is checked for an available move. Without
//!   one the engine ends in `GameOver`.
//!
//! # Example
//!
//! ```
//! use match3_core::{Engine, EngineConfig};
//!
//! let mut engine = Engine::new(EngineConfig::default().with_seed(12345)).unwrap();
//! let (from, to) = engine.hint().expect("new boards always have a move");
//! assert!(engine.attempt_swap(from, to).is_accepted());
//!
//! let events = engine.settle(1_000);
//! assert!(events.score_delta() >= 30);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use grid::{Grid, PieceMove, Spawn};
pub use piece::Piece;
pub use rng::{ColorSource, SimpleRng};
pub use scoring::{clear_score, ClearTally};
pub use snapshot::{BoardSnapshot, PieceView};
