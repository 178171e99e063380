//! Piece module - one occupant of a grid slot
//!
//! A piece keeps its color for life. Its position follows the slot that holds
//! it, and its mark counter records how many runs currently cover it.

use crate::types::{Color, PieceId, Pos};

/// A colored piece placed on the grid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    id: PieceId,
    color: Color,
    position: Pos,
    /// Number of triples covering this piece in the current scan
    mark_count: u8,
    selected: bool,
}

impl Piece {
    pub fn new(id: PieceId, color: Color, position: Pos) -> Self {
        Self {
            id,
            color,
            position,
            mark_count: 0,
            selected: false,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> Pos {
        self.position
    }

    pub fn mark_count(&self) -> u8 {
        self.mark_count
    }

    pub fn is_marked(&self) -> bool {
        self.mark_count > 0
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_position(&mut self, position: Pos) {
        self.position = position;
    }

    /// Record one more run covering this piece
    pub(crate) fn mark(&mut self) {
        self.mark_count = self.mark_count.saturating_add(1);
    }

    pub(crate) fn unmark(&mut self) {
        self.mark_count = 0;
    }

    pub(crate) fn select(&mut self) {
        self.selected = true;
    }

    pub(crate) fn unselect(&mut self) {
        self.selected = false;
    }
}
