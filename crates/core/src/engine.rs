//! Engine module - the resolution state machine
//!
//! The engine ties together the grid, the color source and the phase cycle.
//! Hosts call [`Engine::advance`] once per tick; each call performs exactly
//! one phase step and returns the events it produced, so a renderer can
//! animate between logical updates.

use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::rng::ColorSource;
use crate::scoring::clear_score;
use crate::snapshot::BoardSnapshot;
use crate::types::{Color, EventBatch, GameEvent, Phase, Pos, SwapResult};

/// Match-3 engine
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    grid: Grid,
    colors: ColorSource,
    phase: Phase,
    /// Events produced outside `advance()` (accepted swaps), delivered first
    /// by the next step.
    pending: EventBatch,
    /// Clearing steps since the last accepted swap.
    cascade_depth: u32,
}

impl Engine {
    /// Create an engine with a freshly generated board
    ///
    /// The returned engine is `Idle` and its board has no run and at least
    /// one available move.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let mut colors = color_source(&config);
        let config = EngineConfig {
            rng_seed: Some(colors.seed()),
            ..config
        };
        let grid = Grid::generate(config.width, config.height, &mut colors)?;

        info!(
            width = config.width,
            height = config.height,
            palette = config.palette_size,
            seed = colors.seed(),
            "engine created"
        );

        Ok(Self {
            config,
            grid,
            colors,
            phase: Phase::Idle,
            pending: EventBatch::new(),
            cascade_depth: 0,
        })
    }

    /// Create an engine from explicit colors, rows listed top to bottom
    ///
    /// Board dimensions come from the layout; `config` supplies the palette
    /// and seed used for refills. The engine starts in `Matching`, so the
    /// layout is settled by the normal cascade: runs already present are
    /// cleared, and a layout without moves ends in `GameOver`.
    pub fn from_layout(rows: &[Vec<Color>], config: EngineConfig) -> Result<Self, EngineError> {
        let grid = Grid::from_rows(rows)?;
        let config = EngineConfig {
            width: grid.width(),
            height: grid.height(),
            ..config
        };
        config.validate()?;

        if let Some(piece) = grid
            .pieces()
            .find(|p| p.color().index() >= config.palette_size as usize)
        {
            return Err(EngineError::invalid(format!(
                "color {} at {} is outside a palette of {}",
                piece.color(),
                piece.position(),
                config.palette_size
            )));
        }

        let colors = color_source(&config);
        let config = EngineConfig {
            rng_seed: Some(colors.seed()),
            ..config
        };

        debug!(
            width = config.width,
            height = config.height,
            "engine loaded from layout"
        );

        Ok(Self {
            config,
            grid,
            colors,
            phase: Phase::Matching,
            pending: EventBatch::new(),
            cascade_depth: 0,
        })
    }

    /// Configuration with the effective seed filled in
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Clearing steps performed since the last accepted swap
    pub fn cascade_depth(&self) -> u32 {
        self.cascade_depth
    }

    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.fill_from(&self.grid, self.phase, self.cascade_depth);
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut s = BoardSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Position of the selected piece
    pub fn selected(&self) -> Option<Pos> {
        self.grid.selected().map(|p| p.position())
    }

    /// Select the piece at `pos` (replacing any previous selection)
    ///
    /// Only allowed at rest. Moves the engine to `AwaitingSwap`.
    pub fn select(&mut self, pos: Pos) -> bool {
        if !self.phase.is_at_rest() || !self.grid.select(pos) {
            return false;
        }
        self.transition(Phase::AwaitingSwap);
        true
    }

    pub fn clear_selection(&mut self) {
        self.grid.clear_selection();
        if self.phase == Phase::AwaitingSwap {
            self.transition(Phase::Idle);
        }
    }

    /// Try to exchange two orthogonally adjacent pieces
    ///
    /// The exchange is kept only if it creates at least one run; every
    /// rejection leaves the board untouched.
    pub fn attempt_swap(&mut self, from: Pos, to: Pos) -> SwapResult {
        if !self.phase.is_at_rest() {
            trace!(%from, %to, phase = self.phase.as_str(), "swap rejected: busy");
            return SwapResult::RejectedBusy;
        }
        if !self.grid.contains(from) || !self.grid.contains(to) {
            trace!(%from, %to, "swap rejected: out of bounds");
            return SwapResult::RejectedOutOfBounds;
        }
        if !from.is_orthogonal_neighbor(to) {
            trace!(%from, %to, "swap rejected: not adjacent");
            return SwapResult::RejectedNotAdjacent;
        }

        assert!(
            self.grid.swap(from, to),
            "board at rest has an empty slot at {} or {}",
            from,
            to
        );
        if !self.grid.detect_matches() {
            self.grid.swap(from, to);
            self.grid.clear_marks();
            trace!(%from, %to, "swap rejected: no match");
            return SwapResult::RejectedNoMatch;
        }

        for (src, dst) in [(from, to), (to, from)] {
            if let Some(piece) = self.grid.get(dst) {
                self.pending.push(GameEvent::PieceMoved {
                    piece: piece.id(),
                    from: src,
                    to: dst,
                });
            }
        }

        self.grid.clear_selection();
        self.cascade_depth = 0;
        debug!(%from, %to, "swap accepted");
        self.transition(Phase::Matching);
        SwapResult::Accepted
    }

    /// Perform one phase step and return the events it produced
    ///
    /// At rest and after game over this only drains queued events.
    pub fn advance(&mut self) -> EventBatch {
        let mut batch = std::mem::take(&mut self.pending);

        match self.phase {
            Phase::Idle | Phase::AwaitingSwap | Phase::GameOver => {}
            Phase::Matching => self.step_matching(),
            Phase::Clearing => self.step_clearing(&mut batch),
            Phase::Dropping => self.step_dropping(&mut batch),
            Phase::Refilling => self.step_refilling(&mut batch),
            Phase::MovesCheck => self.step_moves_check(&mut batch),
        }

        batch
    }

    /// Call [`Engine::advance`] until the engine is at rest or over
    ///
    /// Returns every event produced along the way. Stops after `max_steps`
    /// calls even if the cascade is still running.
    pub fn settle(&mut self, max_steps: usize) -> EventBatch {
        let mut all = EventBatch::new();
        for _ in 0..max_steps {
            all.extend(self.advance());
            if !self.phase.is_resolving() {
                break;
            }
        }
        all
    }

    /// First available move, if any. `None` while resolving.
    pub fn hint(&mut self) -> Option<(Pos, Pos)> {
        if !self.phase.is_at_rest() {
            return None;
        }
        self.grid.find_move()
    }

    /// Start over with a freshly generated board
    ///
    /// Continues the engine's random stream, so consecutive resets produce
    /// different boards.
    pub fn reset(&mut self) {
        self.grid.regenerate(&mut self.colors);
        self.pending = EventBatch::new();
        self.cascade_depth = 0;
        info!("engine reset");
        self.transition(Phase::Idle);
    }

    fn transition(&mut self, next: Phase) {
        debug!(from = self.phase.as_str(), to = next.as_str(), "phase transition");
        self.phase = next;
    }

    fn step_matching(&mut self) {
        assert!(self.grid.is_full(), "matching on a board with empty slots");
        self.grid.clear_marks();
        if self.grid.detect_matches() {
            self.transition(Phase::Clearing);
        } else {
            self.transition(Phase::MovesCheck);
        }
    }

    fn step_clearing(&mut self, batch: &mut EventBatch) {
        let cleared = self.grid.take_marked();
        assert!(!cleared.is_empty(), "clearing with no marked pieces");

        self.cascade_depth += 1;
        for piece in &cleared {
            batch.push(GameEvent::Cleared {
                piece: piece.id(),
                position: piece.position(),
                color: piece.color(),
                mark_count: piece.mark_count(),
            });
            batch.push(GameEvent::ScoreDelta {
                amount: clear_score(piece.mark_count()),
            });
        }
        debug!(
            pieces = cleared.len(),
            cascade = self.cascade_depth,
            "pieces cleared"
        );
        self.transition(Phase::Dropping);
    }

    fn step_dropping(&mut self, batch: &mut EventBatch) {
        for m in self.grid.compact_columns() {
            batch.push(GameEvent::PieceMoved {
                piece: m.piece,
                from: m.from,
                to: m.to,
            });
        }
        self.transition(Phase::Refilling);
    }

    fn step_refilling(&mut self, batch: &mut EventBatch) {
        for s in self.grid.refill_columns(&mut self.colors) {
            batch.push(GameEvent::Spawned {
                piece: s.piece,
                color: s.color,
                position: s.from,
            });
            batch.push(GameEvent::PieceMoved {
                piece: s.piece,
                from: s.from,
                to: s.to,
            });
        }
        self.transition(Phase::Matching);
    }

    fn step_moves_check(&mut self, batch: &mut EventBatch) {
        assert!(self.grid.is_full(), "moves check on a board with empty slots");
        if self.grid.has_available_move() {
            self.transition(Phase::Idle);
        } else {
            info!("no moves left");
            batch.push(GameEvent::NoMovesLeft);
            self.transition(Phase::GameOver);
        }
    }
}

fn color_source(config: &EngineConfig) -> ColorSource {
    match config.rng_seed {
        Some(seed) => ColorSource::new(seed, config.palette_size),
        None => ColorSource::from_entropy(config.palette_size),
    }
}
