//! Grid module - owns the pieces and implements the board rules
//!
//! The grid is a `width x height` array of optional pieces using flat,
//! row-major storage (`row * width + col`). Row 0 is the top row.
//!
//! Every off-grid lookup goes through [`Grid::index`], which returns `None`
//! for coordinates outside the board, so neighbour scans never index past an
//! edge.

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use crate::error::EngineError;
use crate::piece::Piece;
use crate::rng::ColorSource;
use crate::types::{Color, PieceId, Pos, MATCH_LEN, MAX_DIMENSION, MIN_DIMENSION};

/// A piece whose logical position changed during compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceMove {
    pub piece: PieceId,
    pub from: Pos,
    pub to: Pos,
}

/// A piece created during refill
///
/// `from` lies above the top edge; the piece is already placed at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub piece: PieceId,
    pub color: Color,
    pub from: Pos,
    pub to: Pos,
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    slots: Vec<Option<Piece>>,
    /// Next id handed to a spawned piece; never rewinds
    next_id: u32,
}

impl Grid {
    /// Create a grid with every slot empty
    pub(crate) fn empty(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            slots: vec![None; width as usize * height as usize],
            next_id: 0,
        }
    }

    /// Generate a settled board: no runs, at least one available move
    ///
    /// Fails for dimensions outside `MIN_DIMENSION..=MAX_DIMENSION`; such a
    /// board could never hold a move.
    pub fn generate(
        width: u8,
        height: u8,
        colors: &mut ColorSource,
    ) -> Result<Self, EngineError> {
        check_dimensions(width as usize, height as usize)?;
        let mut grid = Self::empty(width, height);
        grid.regenerate(colors);
        Ok(grid)
    }

    /// Throw the current pieces away and generate a settled board in place
    ///
    /// Runs are cleared and only the emptied slots are refilled (no gravity)
    /// until the board is run-free. A board without any available move is
    /// discarded and generation starts over.
    pub fn regenerate(&mut self, colors: &mut ColorSource) {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            self.slots.iter_mut().for_each(|slot| *slot = None);
            self.fill_empty(colors);

            while self.detect_matches() {
                self.take_marked();
                self.fill_empty(colors);
            }

            if self.has_available_move() {
                debug!(
                    width = self.width,
                    height = self.height,
                    attempts,
                    "board generated"
                );
                return;
            }
            trace!(attempts, "generated board has no move, starting over");
        }
    }

    /// Build a grid from explicit colors, rows listed top to bottom
    pub fn from_rows(rows: &[Vec<Color>]) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        check_dimensions(width, height)?;
        if let Some(row) = rows.iter().position(|r| r.len() != width) {
            return Err(EngineError::invalid(format!(
                "layout row {} has {} columns, expected {}",
                row,
                rows[row].len(),
                width
            )));
        }

        let mut grid = Self::empty(width as u8, height as u8);
        for (row, colors) in rows.iter().enumerate() {
            for (col, &color) in colors.iter().enumerate() {
                grid.spawn(Pos::new(col as i8, row as i8), color);
            }
        }
        Ok(grid)
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Pos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        Some(pos.row as usize * self.width as usize + pos.col as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Check if a position lies on the board
    pub fn contains(&self, pos: Pos) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as i16) < self.width as i16
            && (pos.row as i16) < self.height as i16
    }

    /// Piece at `pos`; `None` for empty or off-grid slots
    pub fn get(&self, pos: Pos) -> Option<&Piece> {
        self.index(pos).and_then(|idx| self.slots[idx].as_ref())
    }

    fn get_mut(&mut self, pos: Pos) -> Option<&mut Piece> {
        let idx = self.index(pos)?;
        self.slots[idx].as_mut()
    }

    pub fn color_at(&self, pos: Pos) -> Option<Color> {
        self.get(pos).map(Piece::color)
    }

    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.get(pos).is_some()
    }

    /// True when no slot is empty
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// All placed pieces in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.slots.iter().flatten()
    }

    /// Colors as rows (top to bottom), `None` for empty slots
    pub fn color_rows(&self) -> Vec<Vec<Option<Color>>> {
        self.slots
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|slot| slot.as_ref().map(Piece::color)).collect())
            .collect()
    }

    /// Place a new piece into an empty slot
    fn spawn(&mut self, pos: Pos, color: Color) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        if let Some(idx) = self.index(pos) {
            debug_assert!(self.slots[idx].is_none(), "spawn into occupied slot {}", pos);
            self.slots[idx] = Some(Piece::new(id, color, pos));
        }
        id
    }

    /// Fill every empty slot in place with a random piece
    fn fill_empty(&mut self, colors: &mut ColorSource) {
        for row in 0..self.height as i8 {
            for col in 0..self.width as i8 {
                let pos = Pos::new(col, row);
                if !self.is_occupied(pos) {
                    self.spawn(pos, colors.next_color());
                }
            }
        }
    }

    /// Exchange the pieces at `a` and `b`, updating their positions
    ///
    /// Returns false (and changes nothing) if either slot is empty or off the
    /// board, or if `a == b`. No adjacency or match rule is applied here.
    pub fn swap(&mut self, a: Pos, b: Pos) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        if ia == ib || self.slots[ia].is_none() || self.slots[ib].is_none() {
            return false;
        }

        self.slots.swap(ia, ib);
        if let Some(piece) = self.slots[ia].as_mut() {
            piece.set_position(a);
        }
        if let Some(piece) = self.slots[ib].as_mut() {
            piece.set_position(b);
        }
        true
    }

    /// True if the three positions hold pieces of one color
    fn is_run(&self, cells: &[Pos; MATCH_LEN]) -> bool {
        let Some(first) = self.color_at(cells[0]) else {
            return false;
        };
        cells[1..]
            .iter()
            .all(|&pos| self.color_at(pos) == Some(first))
    }

    /// Scan every horizontal and vertical triple once and mark matches
    ///
    /// Each matching triple adds one mark to each of its pieces, so pieces
    /// covered by overlapping runs accumulate several marks. Returns whether
    /// any triple matched.
    pub fn detect_matches(&mut self) -> bool {
        let width = self.width as i8;
        let height = self.height as i8;
        let mut triples: Vec<[Pos; MATCH_LEN]> = Vec::new();

        for row in 0..height {
            for col in 0..=width - MATCH_LEN as i8 {
                let cells = [
                    Pos::new(col, row),
                    Pos::new(col + 1, row),
                    Pos::new(col + 2, row),
                ];
                if self.is_run(&cells) {
                    triples.push(cells);
                }
            }
        }

        for col in 0..width {
            for row in 0..=height - MATCH_LEN as i8 {
                let cells = [
                    Pos::new(col, row),
                    Pos::new(col, row + 1),
                    Pos::new(col, row + 2),
                ];
                if self.is_run(&cells) {
                    triples.push(cells);
                }
            }
        }

        for cells in &triples {
            for &pos in cells {
                if let Some(piece) = self.get_mut(pos) {
                    piece.mark();
                }
            }
        }

        !triples.is_empty()
    }

    /// Reset every mark counter
    pub fn clear_marks(&mut self) {
        self.slots.iter_mut().flatten().for_each(Piece::unmark);
    }

    pub fn has_marks(&self) -> bool {
        self.pieces().any(Piece::is_marked)
    }

    /// Sum of all mark counters
    pub fn total_marks(&self) -> u32 {
        self.pieces().map(|p| p.mark_count() as u32).sum()
    }

    /// Remove every marked piece, returning them in row-major order
    pub fn take_marked(&mut self) -> Vec<Piece> {
        let mut taken = Vec::new();
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(Piece::is_marked) {
                if let Some(piece) = slot.take() {
                    taken.push(piece);
                }
            }
        }
        taken
    }

    /// Compact every column downwards, keeping relative order
    ///
    /// Uses a bottom-up two-pointer walk per column. Returns the pieces whose
    /// row changed.
    pub fn compact_columns(&mut self) -> Vec<PieceMove> {
        let mut moves = Vec::new();
        let width = self.width as usize;
        let height = self.height as usize;

        for col in 0..width {
            let mut write_row = height;
            for read_row in (0..height).rev() {
                let Some(mut piece) = self.slots[read_row * width + col].take() else {
                    continue;
                };
                write_row -= 1;
                if write_row != read_row {
                    let from = piece.position();
                    let to = Pos::new(col as i8, write_row as i8);
                    piece.set_position(to);
                    moves.push(PieceMove {
                        piece: piece.id(),
                        from,
                        to,
                    });
                }
                self.slots[write_row * width + col] = Some(piece);
            }
        }
        moves
    }

    /// Fill the empty top of every column with new random pieces
    ///
    /// Expects compacted columns. For a column with `E` empty slots, the piece
    /// for row `r` starts at row `r - E` so new pieces enter stacked from
    /// above the top edge.
    pub fn refill_columns(&mut self, colors: &mut ColorSource) -> Vec<Spawn> {
        let mut spawns = Vec::new();

        for col in 0..self.width as i8 {
            let empty = (0..self.height as i8)
                .filter(|&row| !self.is_occupied(Pos::new(col, row)))
                .count() as i8;
            debug_assert!(
                (0..empty).all(|row| !self.is_occupied(Pos::new(col, row))),
                "column {} is not compacted",
                col
            );

            for row in 0..empty {
                let to = Pos::new(col, row);
                let from = Pos::new(col, row - empty);
                let color = colors.next_color();
                let piece = self.spawn(to, color);
                spawns.push(Spawn {
                    piece,
                    color,
                    from,
                    to,
                });
            }
        }
        spawns
    }

    /// Compact and refill in one step
    pub fn apply_gravity(&mut self, colors: &mut ColorSource) -> (Vec<PieceMove>, Vec<Spawn>) {
        let moves = self.compact_columns();
        let spawns = self.refill_columns(colors);
        (moves, spawns)
    }

    /// True if every column's pieces sit contiguously at the bottom
    pub fn is_settled(&self) -> bool {
        (0..self.width as i8).all(|col| {
            let mut seen_piece = false;
            (0..self.height as i8).all(|row| {
                let occupied = self.is_occupied(Pos::new(col, row));
                if seen_piece && !occupied {
                    return false;
                }
                seen_piece |= occupied;
                true
            })
        })
    }

    /// First swap (rightward or downward) that would create a run
    ///
    /// Each candidate is applied, scanned, reverted and unmarked; the grid is
    /// unchanged on return. Stops at the first productive swap.
    pub fn find_move(&mut self) -> Option<(Pos, Pos)> {
        for row in 0..self.height as i8 {
            for col in 0..self.width as i8 {
                let here = Pos::new(col, row);
                let mut neighbours: ArrayVec<Pos, 2> = ArrayVec::new();
                if self.contains(here.offset(1, 0)) {
                    neighbours.push(here.offset(1, 0));
                }
                if self.contains(here.offset(0, 1)) {
                    neighbours.push(here.offset(0, 1));
                }

                for there in neighbours {
                    if !self.swap(here, there) {
                        continue;
                    }
                    let found = self.detect_matches();
                    self.swap(here, there);
                    self.clear_marks();
                    if found {
                        return Some((here, there));
                    }
                }
            }
        }
        None
    }

    pub fn has_available_move(&mut self) -> bool {
        self.find_move().is_some()
    }

    /// Currently selected piece, if any
    pub fn selected(&self) -> Option<&Piece> {
        self.pieces().find(|p| p.is_selected())
    }

    /// Select the piece at `pos`, unselecting any other
    pub(crate) fn select(&mut self, pos: Pos) -> bool {
        if !self.is_occupied(pos) {
            return false;
        }
        self.clear_selection();
        if let Some(piece) = self.get_mut(pos) {
            piece.select();
        }
        true
    }

    pub(crate) fn clear_selection(&mut self) {
        self.slots.iter_mut().flatten().for_each(Piece::unselect);
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), EngineError> {
    let limits = MIN_DIMENSION as usize..=MAX_DIMENSION as usize;
    if !limits.contains(&width) || !limits.contains(&height) {
        return Err(EngineError::invalid(format!(
            "board must be within {0}x{0}..={1}x{1}, got {2}x{3}",
            MIN_DIMENSION, MAX_DIMENSION, width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color::{Blue as B, Green as G, Purple as P, Red as R, Yellow as Y};

    fn grid(rows: &[&[Color]]) -> Grid {
        let rows: Vec<Vec<Color>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_index_bounds() {
        let g = Grid::empty(4, 3);
        assert_eq!(g.index(Pos::new(0, 0)), Some(0));
        assert_eq!(g.index(Pos::new(3, 0)), Some(3));
        assert_eq!(g.index(Pos::new(0, 1)), Some(4));
        assert_eq!(g.index(Pos::new(3, 2)), Some(11));
        assert_eq!(g.index(Pos::new(-1, 0)), None);
        assert_eq!(g.index(Pos::new(4, 0)), None);
        assert_eq!(g.index(Pos::new(0, 3)), None);
    }

    #[test]
    fn test_from_rows_places_pieces() {
        let g = grid(&[&[R, B, G], &[B, G, R], &[G, R, B]]);
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 3);
        assert_eq!(g.color_at(Pos::new(1, 0)), Some(B));
        assert_eq!(g.color_at(Pos::new(0, 2)), Some(G));
        for piece in g.pieces() {
            assert_eq!(g.get(piece.position()), Some(piece));
        }
    }

    #[test]
    fn test_from_rows_rejects_ragged_and_small() {
        let ragged = vec![vec![R, B, G], vec![B, G], vec![G, R, B]];
        assert!(Grid::from_rows(&ragged).is_err());

        let small = vec![vec![R, B], vec![B, R]];
        assert!(Grid::from_rows(&small).is_err());
    }

    #[test]
    fn test_horizontal_triple_marks_once() {
        let mut g = grid(&[&[R, R, R, B], &[B, G, B, G], &[G, B, G, B]]);
        assert!(g.detect_matches());
        for col in 0..3 {
            assert_eq!(g.get(Pos::new(col, 0)).unwrap().mark_count(), 1);
        }
        assert_eq!(g.get(Pos::new(3, 0)).unwrap().mark_count(), 0);
        assert_eq!(g.total_marks(), 3);
    }

    #[test]
    fn test_run_of_four_accumulates_middle_marks() {
        let mut g = grid(&[&[R, R, R, R], &[B, G, B, G], &[G, B, G, B]]);
        assert!(g.detect_matches());
        let marks: Vec<u8> = (0..4)
            .map(|c| g.get(Pos::new(c, 0)).unwrap().mark_count())
            .collect();
        assert_eq!(marks, vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_intersection_gets_two_marks() {
        let mut g = grid(&[&[R, B, G], &[R, G, B], &[R, R, R]]);
        assert!(g.detect_matches());
        assert_eq!(g.get(Pos::new(0, 2)).unwrap().mark_count(), 2);
        assert_eq!(g.get(Pos::new(0, 0)).unwrap().mark_count(), 1);
        assert_eq!(g.get(Pos::new(2, 2)).unwrap().mark_count(), 1);
    }

    #[test]
    fn test_detect_skips_empty_slots() {
        let mut g = grid(&[&[R, B, G], &[B, G, R], &[G, R, B]]);
        for col in 0..3 {
            let idx = g.index(Pos::new(col, 0)).unwrap();
            g.slots[idx] = None;
        }
        assert!(!g.detect_matches());
    }

    #[test]
    fn test_swap_updates_positions() {
        let mut g = grid(&[&[R, B, G], &[B, G, R], &[G, R, B]]);
        let a = g.get(Pos::new(0, 0)).unwrap().id();
        let b = g.get(Pos::new(1, 0)).unwrap().id();

        assert!(g.swap(Pos::new(0, 0), Pos::new(1, 0)));
        assert_eq!(g.get(Pos::new(0, 0)).unwrap().id(), b);
        assert_eq!(g.get(Pos::new(1, 0)).unwrap().id(), a);
        assert_eq!(g.get(Pos::new(1, 0)).unwrap().position(), Pos::new(1, 0));

        assert!(!g.swap(Pos::new(0, 0), Pos::new(0, 0)));
        assert!(!g.swap(Pos::new(0, 0), Pos::new(-1, 0)));
    }

    #[test]
    fn test_compact_then_refill() {
        let mut g = grid(&[&[R, B, G], &[B, G, R], &[G, R, B]]);
        let top_mid = g.get(Pos::new(1, 0)).unwrap().id();
        // Remove the middle and bottom pieces of column 1.
        for row in 1..3 {
            let idx = g.index(Pos::new(1, row)).unwrap();
            g.slots[idx] = None;
        }

        let moves = g.compact_columns();
        assert_eq!(
            moves,
            vec![PieceMove {
                piece: top_mid,
                from: Pos::new(1, 0),
                to: Pos::new(1, 2),
            }]
        );
        assert!(g.is_settled());
        assert!(!g.is_full());

        let mut colors = ColorSource::new(3, 8);
        let spawns = g.refill_columns(&mut colors);
        assert_eq!(spawns.len(), 2);
        assert_eq!(spawns[0].from, Pos::new(1, -2));
        assert_eq!(spawns[0].to, Pos::new(1, 0));
        assert_eq!(spawns[1].from, Pos::new(1, -1));
        assert_eq!(spawns[1].to, Pos::new(1, 1));
        assert!(g.is_full());
    }

    #[test]
    fn test_find_move_restores_grid() {
        let mut g = grid(&[&[R, B, R, G], &[B, R, B, G], &[G, P, Y, B]]);
        let before = g.clone();
        let found = g.find_move();
        assert_eq!(found, Some((Pos::new(1, 0), Pos::new(1, 1))));
        assert_eq!(g, before);
    }

    #[test]
    fn test_no_move_on_diagonal_pattern() {
        let mut g = grid(&[&[R, P, B, G], &[P, B, G, R], &[B, G, R, P], &[G, R, P, B]]);
        assert!(!g.detect_matches());
        assert!(g.find_move().is_none());
    }

    #[test]
    fn test_generate_settles_board() {
        for seed in 0..20 {
            let mut colors = ColorSource::new(seed, 8);
            let mut g = Grid::generate(8, 8, &mut colors).unwrap();
            assert!(g.is_full());
            assert!(!g.has_marks());
            assert!(!g.detect_matches(), "seed {} left a run", seed);
            g.clear_marks();
            assert!(g.has_available_move(), "seed {} has no move", seed);
        }
    }

    #[test]
    fn test_generate_rejects_bad_dimensions() {
        let mut colors = ColorSource::new(1, 8);
        for (width, height) in [(2, 2), (2, 8), (8, 2), (0, 0), (65, 8), (200, 200)] {
            let err = Grid::generate(width, height, &mut colors).unwrap_err();
            assert!(matches!(err, EngineError::InvalidConfiguration(_)));
        }
        assert!(Grid::generate(3, 3, &mut colors).is_ok());
        assert!(Grid::generate(64, 3, &mut colors).is_ok());
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut g = grid(&[&[R, B, G], &[B, G, R], &[G, R, B]]);
        assert!(g.select(Pos::new(0, 0)));
        assert!(g.select(Pos::new(2, 2)));
        assert_eq!(g.pieces().filter(|p| p.is_selected()).count(), 1);
        assert_eq!(g.selected().unwrap().position(), Pos::new(2, 2));

        assert!(!g.select(Pos::new(5, 5)));
        g.clear_selection();
        assert!(g.selected().is_none());
    }
}
