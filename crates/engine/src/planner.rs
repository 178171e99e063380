//! Planner - greedy swap ranking
//!
//! Every productive swap is tried on a private copy of the grid. The copy is
//! scanned once, so the ranking only sees the first clearing step of a move
//! and not the cascades that follow.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::core::{clear_score, Grid, Piece};
use crate::types::Pos;

/// One productive swap and what it would clear immediately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOption {
    pub from: Pos,
    pub to: Pos,
    /// Pieces marked by the swap
    pub marked: u32,
    /// Points of the first clearing step
    pub points: u32,
}

/// All productive swaps in row-major order (rightward before downward)
pub fn candidate_moves(grid: &Grid) -> Vec<MoveOption> {
    let mut trial = grid.clone();
    trial.clear_marks();
    let mut options = Vec::new();

    for row in 0..trial.height() as i8 {
        for col in 0..trial.width() as i8 {
            let here = Pos::new(col, row);
            for there in [here.offset(1, 0), here.offset(0, 1)] {
                if !trial.swap(here, there) {
                    continue;
                }
                if trial.detect_matches() {
                    let marked = trial.pieces().filter(|p| p.is_marked()).count() as u32;
                    let points = trial
                        .pieces()
                        .map(|p: &Piece| clear_score(p.mark_count()))
                        .sum();
                    options.push(MoveOption {
                        from: here,
                        to: there,
                        marked,
                        points,
                    });
                }
                trial.swap(here, there);
                trial.clear_marks();
            }
        }
    }
    options
}

/// Swap marking the most pieces; ties go to the earliest in row-major order
pub fn best_move(grid: &Grid) -> Option<MoveOption> {
    candidate_moves(grid)
        .into_iter()
        .min_by_key(|option| Reverse(option.marked))
}
