//! Per-turn decision procedure.
//!
//! Each turn is decided from scratch: attack an adjacent enemy, otherwise
//! step into open space, otherwise stay put. Nothing carries over between
//! turns.

use serde::{Deserialize, Serialize};

use crate::battlefield::BattleField;
use crate::scanner::nearest_enemy_direction;
use crate::spatial::{Direction, GridPos};
use crate::team::Team;

/// Manhattan radius that counts as adjacent.
pub const ADJACENT_RADIUS: u32 = 1;

/// Order in which [`can_move`] checks neighbours.
pub const MOBILITY_PROBE_ORDER: [Direction; 4] = [
    Direction::Down,
    Direction::Up,
    Direction::Right,
    Direction::Left,
];

/// Order in which [`pick_step`] chooses the step actually taken.
///
/// Differs from [`MOBILITY_PROBE_ORDER`]; this one decides where the
/// soldier ends up.
pub const STEP_PRIORITY: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

/// Outcome of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnAction {
    /// Strike the enemy on a cardinal neighbour.
    Attack {
        /// Cell that was struck.
        target: GridPos,
        /// Direction of the target from the attacker.
        direction: Direction,
    },
    /// Step into an open cardinal neighbour.
    Move {
        /// Cell left behind.
        from: GridPos,
        /// Cell stepped into.
        to: GridPos,
        /// Direction of the step.
        direction: Direction,
    },
    /// Neither branch applied.
    Idle,
}

impl TurnAction {
    /// Short label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Attack { .. } => "attack",
            Self::Move { .. } => "move",
            Self::Idle => "idle",
        }
    }
}

/// True when at least one cardinal neighbour is empty and inside the grid.
pub fn can_move<F: BattleField + ?Sized>(grid: &F, pos: GridPos) -> bool {
    MOBILITY_PROBE_ORDER
        .iter()
        .any(|&dir| grid.get(pos.step(dir)).is_empty())
}

/// The first open neighbour in [`STEP_PRIORITY`] order.
pub fn pick_step<F: BattleField + ?Sized>(grid: &F, pos: GridPos) -> Option<Direction> {
    STEP_PRIORITY
        .iter()
        .copied()
        .find(|&dir| grid.get(pos.step(dir)).is_empty())
}

/// Decide what a soldier of `team` standing at `pos` does this turn.
///
/// Pure: reads the grid, issues nothing.
pub fn decide<F: BattleField + ?Sized>(grid: &F, pos: GridPos, team: Team) -> TurnAction {
    let enemy = nearest_enemy_direction(grid, pos, team, ADJACENT_RADIUS);
    match enemy {
        Direction::Up | Direction::Right | Direction::Down | Direction::Left => {
            return TurnAction::Attack {
                target: pos.step(enemy),
                direction: enemy,
            };
        }
        // Nothing within radius 1 can be diagonal under Manhattan distance.
        Direction::UpRight
        | Direction::DownRight
        | Direction::DownLeft
        | Direction::UpLeft
        | Direction::Neutral => {}
    }

    if can_move(grid, pos) {
        if let Some(direction) = pick_step(grid, pos) {
            return TurnAction::Move {
                from: pos,
                to: pos.step(direction),
                direction,
            };
        }
    }

    TurnAction::Idle
}
