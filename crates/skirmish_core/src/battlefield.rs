//! The contract a shared grid offers to the soldiers standing on it.

use crate::spatial::GridPos;
use crate::team::CellState;

/// Read access to the shared grid plus the single write a soldier may make.
///
/// Many soldiers hold a plain shared borrow of the same grid, so
/// [`attack`](Self::attack) takes `&self`; implementors keep their mutable
/// state behind interior mutability. Turns are serialized by the host, so
/// single-threaded cells are enough.
pub trait BattleField {
    /// Occupancy at `pos`.
    ///
    /// Must answer for any coordinate, including ones past the edge. Soldiers
    /// check their four neighbours without bounds checks.
    fn get(&self, pos: GridPos) -> CellState;

    /// Number of rows.
    fn rows(&self) -> i32;

    /// Number of columns.
    fn cols(&self) -> i32;

    /// Strike whatever occupies `pos`. The result is not observed by the caller.
    fn attack(&self, pos: GridPos);

    /// True when `pos` lies inside the grid.
    fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row >= 0 && pos.col >= 0 && pos.row < self.rows() && pos.col < self.cols()
    }
}

impl<F: BattleField + ?Sized> BattleField for &F {
    fn get(&self, pos: GridPos) -> CellState {
        (**self).get(pos)
    }

    fn rows(&self) -> i32 {
        (**self).rows()
    }

    fn cols(&self) -> i32 {
        (**self).cols()
    }

    fn attack(&self, pos: GridPos) {
        (**self).attack(pos);
    }
}
