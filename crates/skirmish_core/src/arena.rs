//! Reference grid implementing [`BattleField`].
//!
//! Cells are stored in row-major order. All edits go through `&self` so the
//! scheduler can keep updating occupancy while soldiers hold shared borrows
//! of the same arena.

use std::cell::RefCell;

use crate::battlefield::BattleField;
use crate::error::{GameError, Result};
use crate::spatial::GridPos;
use crate::team::{CellState, Team};

/// Rectangular battle grid with obstacle support and a pending-strike queue.
#[derive(Debug, Clone)]
pub struct Arena {
    /// Grid height in cells.
    rows: i32,
    /// Grid width in cells.
    cols: i32,
    /// Cell data stored in row-major order.
    cells: RefCell<Vec<CellState>>,
    /// Strikes issued since the last drain, in issue order.
    strikes: RefCell<Vec<GridPos>>,
}

impl Arena {
    /// Create an empty arena.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidDimensions`] if either extent is not positive.
    pub fn new(rows: i32, cols: i32) -> Result<Self> {
        if rows <= 0 || cols <= 0 {
            return Err(GameError::InvalidDimensions { rows, cols });
        }

        let cell_count = (rows as usize) * (cols as usize);
        Ok(Self {
            rows,
            cols,
            cells: RefCell::new(vec![CellState::Empty; cell_count]),
            strikes: RefCell::new(Vec::new()),
        })
    }

    /// Parse a map drawn with `.` (empty), `#` (obstacle), `R` and `B`.
    ///
    /// Blank lines and surrounding whitespace are ignored. Every remaining
    /// line must have the same width.
    pub fn from_ascii(map: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = map
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        let Some(&(_, first)) = lines.first() else {
            return Err(GameError::InvalidMap {
                line: 1,
                message: "map has no rows".into(),
            });
        };
        let cols = first.chars().count() as i32;
        let arena = Self::new(lines.len() as i32, cols)?;

        for (row, &(line_no, line)) in lines.iter().enumerate() {
            if line.chars().count() as i32 != cols {
                return Err(GameError::InvalidMap {
                    line: line_no,
                    message: format!("expected {cols} columns"),
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let pos = GridPos::new(row as i32, col as i32);
                let state = match ch {
                    '.' => CellState::Empty,
                    '#' => CellState::Obstacle,
                    'R' | 'r' => CellState::Occupied(Team::Red),
                    'B' | 'b' => CellState::Occupied(Team::Blue),
                    other => {
                        return Err(GameError::InvalidMap {
                            line: line_no,
                            message: format!("unknown cell '{other}'"),
                        })
                    }
                };
                arena.write(pos, state)?;
            }
        }

        Ok(arena)
    }

    /// Convert a coordinate to a cell index.
    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.row as usize) * (self.cols as usize) + (pos.col as usize))
        } else {
            None
        }
    }

    fn write(&self, pos: GridPos, state: CellState) -> Result<()> {
        let index = self.index(pos).ok_or(GameError::OutOfBounds(pos))?;
        self.cells.borrow_mut()[index] = state;
        Ok(())
    }

    /// Put a soldier marker on an empty cell.
    pub fn place(&self, pos: GridPos, team: Team) -> Result<()> {
        match self.get(pos) {
            CellState::OutOfBounds => Err(GameError::OutOfBounds(pos)),
            CellState::Empty => self.write(pos, CellState::Occupied(team)),
            _ => Err(GameError::CellOccupied(pos)),
        }
    }

    /// Turn a cell into impassable terrain. Soldiers standing there are not
    /// displaced; the cell must be empty.
    pub fn set_obstacle(&self, pos: GridPos) -> Result<()> {
        match self.get(pos) {
            CellState::OutOfBounds => Err(GameError::OutOfBounds(pos)),
            CellState::Empty | CellState::Obstacle => self.write(pos, CellState::Obstacle),
            CellState::Occupied(_) => Err(GameError::CellOccupied(pos)),
        }
    }

    /// Empty a cell and return what was there.
    pub fn clear(&self, pos: GridPos) -> Result<CellState> {
        let previous = self.get(pos);
        if previous == CellState::OutOfBounds {
            return Err(GameError::OutOfBounds(pos));
        }
        self.write(pos, CellState::Empty)?;
        Ok(previous)
    }

    /// Move a soldier marker from `from` to the empty cell `to`.
    pub fn relocate(&self, from: GridPos, to: GridPos) -> Result<()> {
        let CellState::Occupied(team) = self.get(from) else {
            return Err(GameError::NoOccupant(from));
        };
        match self.get(to) {
            CellState::Empty => {}
            CellState::OutOfBounds => return Err(GameError::OutOfBounds(to)),
            _ => return Err(GameError::CellOccupied(to)),
        }
        self.write(from, CellState::Empty)?;
        self.write(to, CellState::Occupied(team))
    }

    /// Drain the strikes issued since the last call, oldest first.
    pub fn take_strikes(&self) -> Vec<GridPos> {
        std::mem::take(&mut *self.strikes.borrow_mut())
    }

    /// Number of cells currently in `state`.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.borrow().iter().filter(|&&c| c == state).count()
    }

    /// Copy of all cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> Vec<CellState> {
        self.cells.borrow().clone()
    }

    /// Render one line per row using the same glyphs [`from_ascii`](Self::from_ascii) reads.
    #[must_use]
    pub fn render(&self) -> String {
        let cells = self.cells.borrow();
        let mut out = String::with_capacity(cells.len() + self.rows as usize);
        for row in cells.chunks(self.cols as usize) {
            out.extend(row.iter().map(|c| c.glyph()));
            out.push('\n');
        }
        out
    }
}

impl BattleField for Arena {
    fn get(&self, pos: GridPos) -> CellState {
        match self.index(pos) {
            Some(index) => self.cells.borrow()[index],
            None => CellState::OutOfBounds,
        }
    }

    fn rows(&self) -> i32 {
        self.rows
    }

    fn cols(&self) -> i32 {
        self.cols
    }

    fn attack(&self, pos: GridPos) {
        tracing::trace!(%pos, "Strike queued");
        self.strikes.borrow_mut().push(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: i32, col: i32) -> GridPos {
        GridPos::new(row, col)
    }

    #[test]
    fn test_arena_creation() {
        let arena = Arena::new(4, 6).unwrap();
        assert_eq!(arena.rows(), 4);
        assert_eq!(arena.cols(), 6);
        assert_eq!(arena.count(CellState::Empty), 24);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Arena::new(0, 5),
            Err(GameError::InvalidDimensions { rows: 0, cols: 5 })
        ));
        assert!(Arena::new(3, -1).is_err());
    }

    #[test]
    fn test_out_of_bounds_reads_are_defined() {
        let arena = Arena::new(3, 3).unwrap();
        assert_eq!(arena.get(pos(-1, 0)), CellState::OutOfBounds);
        assert_eq!(arena.get(pos(0, -1)), CellState::OutOfBounds);
        assert_eq!(arena.get(pos(3, 0)), CellState::OutOfBounds);
        assert_eq!(arena.get(pos(0, 3)), CellState::OutOfBounds);
        assert_eq!(arena.get(pos(2, 2)), CellState::Empty);
    }

    #[test]
    fn test_place_and_relocate() {
        let arena = Arena::new(3, 3).unwrap();
        arena.place(pos(1, 1), Team::Red).unwrap();
        assert!(matches!(
            arena.place(pos(1, 1), Team::Blue),
            Err(GameError::CellOccupied(_))
        ));

        arena.relocate(pos(1, 1), pos(1, 0)).unwrap();
        assert_eq!(arena.get(pos(1, 1)), CellState::Empty);
        assert_eq!(arena.get(pos(1, 0)), CellState::Occupied(Team::Red));

        assert!(matches!(
            arena.relocate(pos(2, 2), pos(2, 1)),
            Err(GameError::NoOccupant(_))
        ));
        assert!(matches!(
            arena.relocate(pos(1, 0), pos(1, -1)),
            Err(GameError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_obstacles_block_placement() {
        let arena = Arena::new(2, 2).unwrap();
        arena.set_obstacle(pos(0, 0)).unwrap();
        assert!(arena.place(pos(0, 0), Team::Blue).is_err());
        assert_eq!(arena.clear(pos(0, 0)).unwrap(), CellState::Obstacle);
        assert!(arena.place(pos(0, 0), Team::Blue).is_ok());
    }

    #[test]
    fn test_strikes_drain_in_order() {
        let arena = Arena::new(3, 3).unwrap();
        arena.attack(pos(0, 1));
        arena.attack(pos(2, 2));
        assert_eq!(arena.take_strikes(), vec![pos(0, 1), pos(2, 2)]);
        assert!(arena.take_strikes().is_empty());
    }

    #[test]
    fn test_ascii_roundtrip() {
        let map = "R..#\n.B..\n....\n";
        let arena = Arena::from_ascii(map).unwrap();
        assert_eq!(arena.rows(), 3);
        assert_eq!(arena.cols(), 4);
        assert_eq!(arena.get(pos(0, 0)), CellState::Occupied(Team::Red));
        assert_eq!(arena.get(pos(1, 1)), CellState::Occupied(Team::Blue));
        assert_eq!(arena.get(pos(0, 3)), CellState::Obstacle);
        assert_eq!(arena.render(), map);
    }

    #[test]
    fn test_ascii_rejects_ragged_rows() {
        let err = Arena::from_ascii("...\n..\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidMap { line: 2, .. }));
    }

    #[test]
    fn test_ascii_rejects_unknown_glyph() {
        assert!(Arena::from_ascii("..x\n").is_err());
        assert!(Arena::from_ascii("\n\n").is_err());
    }
}
