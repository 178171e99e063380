//! Scoring module - points for cleared pieces
//!
//! A cleared piece is worth `POINTS_PER_MARK` for every run that covered it,
//! so a piece sitting on the crossing of a horizontal and a vertical run
//! scores twice.

use crate::types::{GameEvent, POINTS_PER_MARK};

/// Points for one cleared piece
pub fn clear_score(mark_count: u8) -> u32 {
    POINTS_PER_MARK * mark_count as u32
}

/// Totals over one resolved move (all cascade steps)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearTally {
    pub pieces: u32,
    pub marks: u32,
    pub points: u32,
}

impl ClearTally {
    /// Fold one event into the tally
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Cleared { mark_count, .. } => {
                self.pieces += 1;
                self.marks += *mark_count as u32;
            }
            GameEvent::ScoreDelta { amount } => {
                self.points = self.points.saturating_add(*amount);
            }
            _ => {}
        }
    }
}
