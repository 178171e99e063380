//! Session module - one player's game on top of the engine
//!
//! The session owns the score and play statistics, and turns raw grid clicks
//! into selections and swap attempts.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{BoardSnapshot, ClearTally, Engine, EngineConfig, EngineError};
use crate::types::{EventBatch, Phase, Pos, SwapResult};

/// Play statistics since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Accepted swaps
    pub moves: u32,
    pub pieces_cleared: u32,
    /// Clearing steps over all moves
    pub cascades: u32,
    /// Most clearing steps caused by a single move
    pub deepest_cascade: u32,
}

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// The clicked piece is now selected
    Selected(Pos),
    /// The selected piece and the clicked piece were swapped
    Swapped { from: Pos, to: Pos },
    /// The swap was refused and the clicked piece became the selection
    Reselected { pos: Pos, reason: SwapResult },
    /// Click outside the board, on an empty slot, or while resolving
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Session {
    engine: Engine,
    score: u64,
    stats: Stats,
    game_over: bool,
}

impl Session {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::from_engine(Engine::new(config)?))
    }

    pub fn from_engine(engine: Engine) -> Self {
        let game_over = engine.is_game_over();
        Self {
            engine,
            score: 0,
            stats: Stats::default(),
            game_over,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.engine.snapshot()
    }

    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        self.engine.snapshot_into(out);
    }

    pub fn hint(&mut self) -> Option<(Pos, Pos)> {
        self.engine.hint()
    }

    /// Run one engine step and fold its events into score and stats
    pub fn advance(&mut self) -> EventBatch {
        let batch = self.engine.advance();

        let mut tally = ClearTally::default();
        for event in &batch {
            tally.record(event);
        }
        self.score = self.score.saturating_add(tally.points as u64);
        self.stats.pieces_cleared += tally.pieces;

        if tally.pieces > 0 {
            self.stats.cascades += 1;
            self.stats.deepest_cascade = self
                .stats
                .deepest_cascade
                .max(self.engine.cascade_depth());
        }
        if batch.has_no_moves_left() {
            self.game_over = true;
            info!(score = self.score, moves = self.stats.moves, "session over");
        }
        batch
    }

    pub fn attempt_swap(&mut self, from: Pos, to: Pos) -> SwapResult {
        let result = self.engine.attempt_swap(from, to);
        if result.is_accepted() {
            self.stats.moves += 1;
        }
        result
    }

    /// Handle a click on grid coordinates
    ///
    /// With nothing selected the clicked piece is selected. With a selection,
    /// a click within one cell on both axes is offered as a swap; anything the
    /// engine refuses leaves the clicked piece selected instead. Clicks farther
    /// away move the selection.
    pub fn click(&mut self, pos: Pos) -> ClickOutcome {
        if !self.phase().is_at_rest() || !self.engine.grid().is_occupied(pos) {
            return ClickOutcome::Ignored;
        }

        match self.engine.selected() {
            Some(selected) if selected.is_within_reach(pos) => {
                let result = self.attempt_swap(selected, pos);
                if result.is_accepted() {
                    ClickOutcome::Swapped {
                        from: selected,
                        to: pos,
                    }
                } else {
                    debug!(%pos, ?result, "swap refused, reselecting");
                    self.engine.select(pos);
                    ClickOutcome::Reselected {
                        pos,
                        reason: result,
                    }
                }
            }
            _ => {
                self.engine.select(pos);
                ClickOutcome::Selected(pos)
            }
        }
    }

    /// Fresh board, zero score and statistics
    pub fn reset(&mut self) {
        self.engine.reset();
        self.score = 0;
        self.stats = Stats::default();
        self.game_over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color::{self, Blue as B, Green as G, Purple as P, Red as R, Yellow as Y};

    fn session(rows: &[&[Color]]) -> Session {
        let rows: Vec<Vec<Color>> = rows.iter().map(|r| r.to_vec()).collect();
        let engine = Engine::from_layout(&rows, EngineConfig::default().with_seed(3)).unwrap();
        let mut session = Session::from_engine(engine);
        resolve(&mut session);
        session
    }

    fn resolve(session: &mut Session) {
        while session.phase().is_resolving() {
            session.advance();
        }
    }

    const ONE_MOVE: &[&[Color]] = &[&[R, B, R, G], &[B, R, B, G], &[G, P, Y, B]];

    #[test]
    fn test_new_session_is_fresh() {
        let s = Session::new(EngineConfig::default().with_seed(1)).unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.stats(), Stats::default());
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.is_game_over());
    }

    #[test]
    fn test_first_click_selects() {
        let mut s = session(ONE_MOVE);
        assert_eq!(s.click(Pos::new(1, 0)), ClickOutcome::Selected(Pos::new(1, 0)));
        assert_eq!(s.phase(), Phase::AwaitingSwap);
        assert_eq!(s.engine().selected(), Some(Pos::new(1, 0)));
    }

    #[test]
    fn test_click_neighbour_swaps() {
        let mut s = session(ONE_MOVE);
        s.click(Pos::new(1, 0));
        assert_eq!(
            s.click(Pos::new(1, 1)),
            ClickOutcome::Swapped {
                from: Pos::new(1, 0),
                to: Pos::new(1, 1),
            }
        );
        assert_eq!(s.stats().moves, 1);
        assert_eq!(s.phase(), Phase::Matching);
        assert_eq!(s.click(Pos::new(0, 0)), ClickOutcome::Ignored);
    }

    #[test]
    fn test_diagonal_click_reselects() {
        let mut s = session(ONE_MOVE);
        s.click(Pos::new(1, 0));
        assert_eq!(
            s.click(Pos::new(2, 1)),
            ClickOutcome::Reselected {
                pos: Pos::new(2, 1),
                reason: SwapResult::RejectedNotAdjacent,
            }
        );
        assert_eq!(s.engine().selected(), Some(Pos::new(2, 1)));
        assert_eq!(s.stats().moves, 0);
    }

    #[test]
    fn test_far_click_moves_selection() {
        let mut s = session(ONE_MOVE);
        s.click(Pos::new(0, 0));
        assert_eq!(s.click(Pos::new(3, 2)), ClickOutcome::Selected(Pos::new(3, 2)));
        assert_eq!(s.engine().selected(), Some(Pos::new(3, 2)));
    }

    #[test]
    fn test_off_board_click_is_ignored() {
        let mut s = session(ONE_MOVE);
        assert_eq!(s.click(Pos::new(9, 0)), ClickOutcome::Ignored);
        assert_eq!(s.engine().selected(), None);
    }

    #[test]
    fn test_score_is_sum_of_deltas() {
        let mut s = session(ONE_MOVE);
        assert!(s.attempt_swap(Pos::new(1, 0), Pos::new(1, 1)).is_accepted());

        let mut total = 0u64;
        while s.phase().is_resolving() {
            total += s.advance().score_delta() as u64;
        }
        assert!(total >= 60);
        assert_eq!(s.score(), total);
        assert!(s.stats().pieces_cleared >= 6);
        assert!(s.stats().cascades >= 1);
        assert!(s.stats().deepest_cascade >= 1);
    }

    #[test]
    fn test_stats_fold_every_cleared_event() {
        let mut s = session(ONE_MOVE);
        assert!(s.attempt_swap(Pos::new(1, 0), Pos::new(1, 1)).is_accepted());

        let mut cleared = 0;
        let mut points = 0;
        let mut clearing_steps = 0;
        while s.phase().is_resolving() {
            let batch = s.advance();
            if batch.cleared_count() > 0 {
                clearing_steps += 1;
            }
            cleared += batch.cleared_count() as u32;
            points += batch.score_delta() as u64;
        }
        assert_eq!(s.stats().pieces_cleared, cleared);
        assert_eq!(s.stats().cascades, clearing_steps);
        assert_eq!(s.stats().deepest_cascade, clearing_steps);
        assert_eq!(s.score(), points);
    }

    #[test]
    fn test_stalemate_ends_session_and_reset_restores() {
        let mut s = session(&[&[R, P, B, G], &[P, B, G, R], &[B, G, R, P], &[G, R, P, B]]);
        assert!(s.is_game_over());
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(
            s.attempt_swap(Pos::new(0, 0), Pos::new(1, 0)),
            SwapResult::RejectedBusy
        );

        s.reset();
        assert!(!s.is_game_over());
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.score(), 0);
        assert!(s.hint().is_some());
    }
}
