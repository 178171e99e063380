use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::{Color, Phase, PieceId, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceView {
    pub id: PieceId,
    pub position: Pos,
    pub color: Color,
    pub marked: bool,
    pub selected: bool,
}

/// Read-only view of the board for full redraws
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    pub phase: Phase,
    pub cascade_depth: u32,
    /// Occupied slots in row-major order
    pub pieces: Vec<PieceView>,
}

impl BoardSnapshot {
    /// Overwrite this snapshot from a grid, reusing the piece buffer.
    pub fn fill_from(&mut self, grid: &Grid, phase: Phase, cascade_depth: u32) {
        self.width = grid.width();
        self.height = grid.height();
        self.phase = phase;
        self.cascade_depth = cascade_depth;
        self.pieces.clear();
        self.pieces.extend(grid.pieces().map(|p| PieceView {
            id: p.id(),
            position: p.position(),
            color: p.color(),
            marked: p.is_marked(),
            selected: p.is_selected(),
        }));
    }

    pub fn piece_at(&self, pos: Pos) -> Option<&PieceView> {
        self.pieces.iter().find(|p| p.position == pos)
    }

    pub fn color_at(&self, pos: Pos) -> Option<Color> {
        self.piece_at(pos).map(|p| p.color)
    }

    pub fn selected(&self) -> Option<&PieceView> {
        self.pieces.iter().find(|p| p.selected)
    }

    pub fn playable(&self) -> bool {
        self.phase.is_at_rest()
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            phase: Phase::Idle,
            cascade_depth: 0,
            pieces: Vec::new(),
        }
    }
}

/// One line per row; `.` for empty slots, lowercase for the selected piece.
impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width as usize;
        let mut cells = vec!['.'; width * self.height as usize];
        for piece in &self.pieces {
            let idx = piece.position.row as usize * width + piece.position.col as usize;
            let glyph = piece.color.glyph();
            cells[idx] = if piece.selected {
                glyph.to_ascii_lowercase()
            } else {
                glyph
            };
        }
        for row in cells.chunks(width.max(1)) {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
