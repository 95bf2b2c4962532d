//! Grid coordinates, Manhattan distance, and eight-way direction.
//!
//! Rows grow downward and columns grow to the right, so "up" means a smaller
//! row index. All distances are Manhattan distances: under this metric only
//! the four cardinal neighbours are adjacent, never the diagonals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A (row, col) coordinate on the shared grid.
///
/// Coordinates are signed so that probing one step past an edge yields a
/// representable position the grid can answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Row index, 0 at the top edge.
    pub row: i32,
    /// Column index, 0 at the left edge.
    pub col: i32,
}

impl GridPos {
    /// Create a new grid coordinate.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The neighbouring coordinate one step in `direction`.
    ///
    /// [`Direction::Neutral`] returns `self`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.offset();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

/// Discretized direction from one cell toward another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Same column, smaller row.
    Up,
    /// Same row, larger column.
    Right,
    /// Same column, larger row.
    Down,
    /// Same row, smaller column.
    Left,
    /// Smaller row, larger column.
    UpRight,
    /// Larger row, larger column.
    DownRight,
    /// Larger row, smaller column.
    DownLeft,
    /// Smaller row, smaller column.
    UpLeft,
    /// Source and target coincide, or nothing was found.
    Neutral,
}

impl Direction {
    /// The four cardinal directions.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// All nine values, in legacy code order with `Neutral` last.
    pub const ALL: [Direction; 9] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::UpRight,
        Direction::DownRight,
        Direction::DownLeft,
        Direction::UpLeft,
        Direction::Neutral,
    ];

    /// Row and column delta of one step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::UpRight => (-1, 1),
            Self::DownRight => (1, 1),
            Self::DownLeft => (1, -1),
            Self::UpLeft => (-1, -1),
            Self::Neutral => (0, 0),
        }
    }

    /// True for up, right, down and left.
    #[must_use]
    pub const fn is_cardinal(self) -> bool {
        matches!(self, Self::Up | Self::Right | Self::Down | Self::Left)
    }

    /// True for the four in-between directions.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::UpRight | Self::DownRight | Self::DownLeft | Self::UpLeft
        )
    }

    /// Legacy integer code: 0..=7 for the eight directions, -1 for neutral.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
            Self::UpRight => 4,
            Self::DownRight => 5,
            Self::DownLeft => 6,
            Self::UpLeft => 7,
            Self::Neutral => -1,
        }
    }

    /// Inverse of [`code`](Self::code).
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            4 => Some(Self::UpRight),
            5 => Some(Self::DownRight),
            6 => Some(Self::DownLeft),
            7 => Some(Self::UpLeft),
            -1 => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
            Self::UpRight => "up-right",
            Self::DownRight => "down-right",
            Self::DownLeft => "down-left",
            Self::UpLeft => "up-left",
            Self::Neutral => "neutral",
        };
        f.write_str(name)
    }
}

/// Manhattan distance between two cells: `|Δrow| + |Δcol|`.
#[inline]
#[must_use]
pub fn distance(from: GridPos, to: GridPos) -> u32 {
    from.row.abs_diff(to.row) + from.col.abs_diff(to.col)
}

/// Direction from `from` toward `to`.
///
/// The cases are checked in a fixed order and the first match wins. Axis
/// aligned targets map to the cardinal directions, anything else to the
/// matching diagonal, and identical coordinates to [`Direction::Neutral`].
#[must_use]
pub fn direction(from: GridPos, to: GridPos) -> Direction {
    if to.col == from.col && to.row > from.row {
        Direction::Down
    } else if to.col == from.col && to.row < from.row {
        Direction::Up
    } else if to.row == from.row && to.col < from.col {
        Direction::Left
    } else if to.row == from.row && to.col > from.col {
        Direction::Right
    } else if to.row < from.row && to.col > from.col {
        Direction::UpRight
    } else if to.row > from.row && to.col > from.col {
        Direction::DownRight
    } else if to.row > from.row && to.col < from.col {
        Direction::DownLeft
    } else if to.row < from.row && to.col < from.col {
        Direction::UpLeft
    } else {
        Direction::Neutral
    }
}
