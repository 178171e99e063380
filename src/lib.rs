//! Match-3 puzzle engine (workspace facade crate).
//!
//! The rules live in dedicated crates under `crates/`; this package re-exports
//! them as `match3::{core,engine,types}` and adds the host configuration used
//! by the `match3` binary.

pub mod config;
pub mod error;

pub use match3_core as core;
pub use match3_engine as engine;
pub use match3_types as types;
