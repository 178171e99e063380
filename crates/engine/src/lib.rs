//! Session layer on top of the core engine
//!
//! - [`session`]: score, statistics and the click-driven selection flow
//! - [`planner`]: ranks available swaps for hints and autoplay
//! - [`shared`]: a session behind one exclusive lock for multi-threaded hosts

pub mod planner;
pub mod session;
pub mod shared;

pub use match3_core as core;
pub use match3_types as types;

pub use planner::{best_move, candidate_moves, MoveOption};
pub use session::{ClickOutcome, Session, Stats};
pub use shared::SharedSession;
