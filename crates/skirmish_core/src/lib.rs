//! # Skirmish Core
//!
//! Decision procedure for a grid combat soldier, plus the reference grid and
//! turn scheduler that host it.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No randomness
//!
//! Each soldier, when given its turn, attacks an adjacent enemy, steps into
//! open space, or stays put, reading the shared grid and writing nothing but
//! strikes.
//!
//! ## Crate Structure
//!
//! - [`spatial`] - Coordinates, Manhattan distance, eight-way direction
//! - [`scanner`] - Full-grid nearest friend/enemy scans and counts
//! - [`policy`] - The per-turn decision
//! - [`soldier`] - The combat unit
//! - [`battlefield`] - Contract the grid offers to soldiers
//! - [`arena`] - Reference grid
//! - [`simulation`] - Turn scheduler and strike resolution

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod arena;
pub mod battlefield;
pub mod combat;
pub mod data;
pub mod error;
pub mod policy;
pub mod scanner;
pub mod simulation;
pub mod soldier;
pub mod spatial;
pub mod team;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::arena::Arena;
    pub use crate::battlefield::BattleField;
    pub use crate::data::SoldierProfile;
    pub use crate::error::{GameError, Result};
    pub use crate::policy::TurnAction;
    pub use crate::simulation::{BattleResult, Outcome, RoundReport, Skirmish, SoldierId};
    pub use crate::soldier::Soldier;
    pub use crate::spatial::{direction, distance, Direction, GridPos};
    pub use crate::team::{CellState, Team};
}
