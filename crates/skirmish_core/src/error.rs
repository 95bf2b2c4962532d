//! Error types for the skirmish simulation.
//!
//! The soldier decision procedure never fails. These errors come from the
//! collaborators around it: grid construction and occupancy edits, the turn
//! scheduler, and data loading.

use thiserror::Error;

use crate::spatial::GridPos;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all skirmish simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Grid extent must be positive in both dimensions.
    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Requested row count.
        rows: i32,
        /// Requested column count.
        cols: i32,
    },

    /// Coordinate lies outside the grid.
    #[error("Position {0} is out of bounds")]
    OutOfBounds(GridPos),

    /// Target cell already holds a soldier or an obstacle.
    #[error("Cell {0} is already occupied")]
    CellOccupied(GridPos),

    /// Expected a soldier at this cell but found none.
    #[error("No soldier at {0}")]
    NoOccupant(GridPos),

    /// Invalid soldier identifier.
    #[error("Soldier not found: {0}")]
    SoldierNotFound(u32),

    /// Failed to read a data file.
    #[error("Failed to read data file '{path}': {source}")]
    DataRead {
        /// Path to the file that failed to load.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Map text could not be parsed.
    #[error("Invalid map at line {line}: {message}")]
    InvalidMap {
        /// One-based line number.
        line: usize,
        /// Error message.
        message: String,
    },

    /// Snapshot encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
