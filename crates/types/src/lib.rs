//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data, usable from the engine, from hosts that render the
//! board, and from anything that serializes the event stream.
//!
//! # Coordinates
//!
//! Positions are `(col, row)` pairs:
//!
//! - **col**: 0 is the leftmost column
//! - **row**: 0 is the top row, rows grow downwards
//!
//! Coordinates are signed so that spawn origins just above the top edge
//! (negative rows) can be reported to hosts animating falling pieces.
//!
//! # Board Limits
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_DIMENSION` | 3 | A board must fit one run in each direction |
//! | `MAX_DIMENSION` | 64 | Keeps every spawn origin representable |
//! | `DEFAULT_WIDTH` | 8 | Classic board width |
//! | `DEFAULT_HEIGHT` | 8 | Classic board height |
//! | `MIN_PALETTE_SIZE` | 3 | Smallest palette accepted by the engine |
//! | `PALETTE_SIZE` | 8 | Number of colors in the full palette |
//!
//! # Examples
//!
//! ```
//! use match3_types::{Color, Pos, SwapResult};
//!
//! let a = Pos::new(2, 3);
//! let b = Pos::new(3, 3);
//! assert!(a.is_orthogonal_neighbor(b));
//! assert!(!a.is_orthogonal_neighbor(Pos::new(3, 4)));
//!
//! assert_eq!(Color::from_str("blue"), Some(Color::Blue));
//! assert!(SwapResult::Accepted.is_accepted());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest accepted board dimension (one run must fit).
pub const MIN_DIMENSION: u8 = 3;

/// Largest accepted board dimension.
pub const MAX_DIMENSION: u8 = 64;

/// Default board width in columns
pub const DEFAULT_WIDTH: u8 = 8;

/// Default board height in rows
pub const DEFAULT_HEIGHT: u8 = 8;

/// Number of same-colored pieces that form a run
pub const MATCH_LEN: usize = 3;

/// Number of colors in the full palette
pub const PALETTE_SIZE: u8 = 8;

/// Smallest palette the engine accepts
pub const MIN_PALETTE_SIZE: u8 = 3;

/// Points awarded per mark on a cleared piece
pub const POINTS_PER_MARK: u32 = 10;

/// Suggested host cadence for `advance()` (36 ticks per second).
pub const TICK_MS: u32 = 28;

/// Piece colors
///
/// The palette order is fixed; a board with `palette_size = n` draws from the
/// first `n` entries of [`Color::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Purple,
    Blue,
    Green,
    Yellow,
    Orange,
    Pink,
    Magenta,
}

impl Color {
    /// The full palette, in draw order
    pub const ALL: [Color; PALETTE_SIZE as usize] = [
        Color::Red,
        Color::Purple,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Pink,
        Color::Magenta,
    ];

    /// Color at a palette index
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::Color;
    ///
    /// assert_eq!(Color::from_index(0), Some(Color::Red));
    /// assert_eq!(Color::from_index(7), Some(Color::Magenta));
    /// assert_eq!(Color::from_index(8), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position of this color in the palette
    pub fn index(&self) -> usize {
        match self {
            Color::Red => 0,
            Color::Purple => 1,
            Color::Blue => 2,
            Color::Green => 3,
            Color::Yellow => 4,
            Color::Orange => 5,
            Color::Pink => 6,
            Color::Magenta => 7,
        }
    }

    /// Parse color from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Color::Red),
            "purple" => Some(Color::Purple),
            "blue" => Some(Color::Blue),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            "orange" => Some(Color::Orange),
            "pink" => Some(Color::Pink),
            "magenta" => Some(Color::Magenta),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Purple => "purple",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Pink => "pink",
            Color::Magenta => "magenta",
        }
    }

    /// Single-character tag used by text renderings of the board
    pub fn glyph(&self) -> char {
        match self {
            Color::Red => 'R',
            Color::Purple => 'P',
            Color::Blue => 'B',
            Color::Green => 'G',
            Color::Yellow => 'Y',
            Color::Orange => 'O',
            Color::Pink => 'K',
            Color::Magenta => 'M',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical grid coordinates `(col, row)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub col: i8,
    pub row: i8,
}

impl Pos {
    pub const fn new(col: i8, row: i8) -> Self {
        Self { col, row }
    }

    /// Position shifted by `(dc, dr)`
    pub fn offset(self, dc: i8, dr: i8) -> Self {
        Self {
            col: self.col.saturating_add(dc),
            row: self.row.saturating_add(dr),
        }
    }

    /// Manhattan distance between two positions
    pub fn manhattan(self, other: Pos) -> u16 {
        let dc = (self.col as i16 - other.col as i16).unsigned_abs();
        let dr = (self.row as i16 - other.row as i16).unsigned_abs();
        dc + dr
    }

    /// Orthogonal adjacency: `|Δcol| + |Δrow| == 1`
    ///
    /// Diagonal neighbours and the position itself are not adjacent.
    pub fn is_orthogonal_neighbor(self, other: Pos) -> bool {
        self.manhattan(other) == 1
    }

    /// Loose 8-neighbourhood test (including diagonals and `self`).
    ///
    /// Used only to decide whether a click should be offered as a swap.
    pub fn is_within_reach(self, other: Pos) -> bool {
        (self.col as i16 - other.col as i16).abs() <= 1
            && (self.row as i16 - other.row as i16).abs() <= 1
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Stable per-piece identifier, unique within one engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

/// Resolution phase of the engine
///
/// The cycle goes: `Matching → Clearing → Dropping → Refilling → Matching → …`
/// until no run is left, then `MovesCheck → Idle | GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// At rest, nothing selected
    Idle,
    /// At rest, one piece selected
    AwaitingSwap,
    /// Scan for runs on the next step
    Matching,
    /// Remove marked pieces on the next step
    Clearing,
    /// Compact columns on the next step
    Dropping,
    /// Spawn replacement pieces on the next step
    Refilling,
    /// Look for an available move on the next step
    MovesCheck,
    /// No moves left; terminal until reset
    GameOver,
}

impl Phase {
    /// True when the engine accepts player input
    pub fn is_at_rest(&self) -> bool {
        matches!(self, Phase::Idle | Phase::AwaitingSwap)
    }

    /// True while a cascade is being resolved
    pub fn is_resolving(&self) -> bool {
        matches!(
            self,
            Phase::Matching
                | Phase::Clearing
                | Phase::Dropping
                | Phase::Refilling
                | Phase::MovesCheck
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::AwaitingSwap => "awaiting_swap",
            Phase::Matching => "matching",
            Phase::Clearing => "clearing",
            Phase::Dropping => "dropping",
            Phase::Refilling => "refilling",
            Phase::MovesCheck => "moves_check",
            Phase::GameOver => "game_over",
        }
    }
}

/// Outcome of a swap attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapResult {
    /// Exchange kept; the engine moved to `Matching`
    Accepted,
    /// Positions are not orthogonally adjacent
    RejectedNotAdjacent,
    /// Exchange formed no run and was reverted
    RejectedNoMatch,
    /// Engine is resolving a cascade or the game is over
    RejectedBusy,
    /// A position lies outside the board
    RejectedOutOfBounds,
}

impl SwapResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SwapResult::Accepted)
    }
}

/// Events emitted by the engine, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A marked piece was destroyed
    Cleared {
        piece: PieceId,
        position: Pos,
        color: Color,
        mark_count: u8,
    },
    /// Points earned by the preceding clear
    ScoreDelta { amount: u32 },
    /// A piece's logical position changed (swap, drop or spawn fall)
    PieceMoved { piece: PieceId, from: Pos, to: Pos },
    /// A new piece entered the board at a position above the top edge
    Spawned {
        piece: PieceId,
        color: Color,
        position: Pos,
    },
    /// Move-availability analysis found nothing; the game is over
    NoMovesLeft,
}

/// Ordered events produced by one engine step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventBatch {
    events: Vec<GameEvent>,
}

impl EventBatch {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[GameEvent] {
        &self.events
    }

    /// Sum of all `ScoreDelta` amounts in this batch
    pub fn score_delta(&self) -> u32 {
        self.events
            .iter()
            .map(|e| match e {
                GameEvent::ScoreDelta { amount } => *amount,
                _ => 0,
            })
            .sum()
    }

    /// Number of `Cleared` events in this batch
    pub fn cleared_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::Cleared { .. }))
            .count()
    }

    /// True if the batch announces the end of the game
    pub fn has_no_moves_left(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, GameEvent::NoMovesLeft))
    }
}

impl Extend<GameEvent> for EventBatch {
    fn extend<T: IntoIterator<Item = GameEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

impl IntoIterator for EventBatch {
    type Item = GameEvent;
    type IntoIter = std::vec::IntoIter<GameEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventBatch {
    type Item = &'a GameEvent;
    type IntoIter = std::slice::Iter<'a, GameEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
