//! The soldier: a position, a team, some health, and a borrowed grid.

use crate::battlefield::BattleField;
use crate::data::SoldierProfile;
use crate::policy::{self, TurnAction};
use crate::scanner;
use crate::spatial::{direction, distance, Direction, GridPos};
use crate::team::Team;

pub use crate::data::INITIAL_HEALTH;

/// A combat unit standing on a shared grid.
///
/// The soldier borrows the grid and never outlives it. It reads any cell,
/// writes nothing but strikes, and keeps its own position in step with its
/// moves; mirroring a move onto the grid's occupancy is the host's job.
#[derive(Debug)]
pub struct Soldier<'a, F: BattleField + ?Sized> {
    grid: &'a F,
    position: GridPos,
    health: u32,
    team: Team,
}

impl<'a, F: BattleField + ?Sized> Soldier<'a, F> {
    /// Create a soldier with [`INITIAL_HEALTH`].
    #[must_use]
    pub fn new(grid: &'a F, team: Team, position: GridPos) -> Self {
        Self {
            grid,
            position,
            health: INITIAL_HEALTH,
            team,
        }
    }

    /// Create a soldier whose starting health comes from `profile`.
    #[must_use]
    pub fn with_profile(grid: &'a F, team: Team, position: GridPos, profile: &SoldierProfile) -> Self {
        Self {
            health: profile.initial_health,
            ..Self::new(grid, team, position)
        }
    }

    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Team, fixed at creation.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// True while health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// The grid this soldier stands on.
    #[must_use]
    pub const fn grid(&self) -> &'a F {
        self.grid
    }

    /// Apply damage from strike resolution. Saturates at zero.
    pub fn receive_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Manhattan distance from this soldier to `to`.
    #[must_use]
    pub fn distance_to(&self, to: GridPos) -> u32 {
        distance(self.position, to)
    }

    /// Direction from this soldier toward `to`.
    #[must_use]
    pub fn direction_to(&self, to: GridPos) -> Direction {
        direction(self.position, to)
    }

    /// True when an adjacent cardinal cell is empty.
    #[must_use]
    pub fn can_move(&self) -> bool {
        policy::can_move(self.grid, self.position)
    }

    /// Opposing soldiers anywhere on the grid.
    #[must_use]
    pub fn count_enemies_remaining(&self) -> usize {
        scanner::count_enemies_remaining(self.grid, self.team)
    }

    /// Direction of the closest teammate, or neutral when alone.
    #[must_use]
    pub fn nearest_friend_direction(&self) -> Direction {
        scanner::nearest_friend_direction(self.grid, self.position, self.team)
    }

    /// Teammates within `radius`, not counting this soldier.
    #[must_use]
    pub fn count_nearby_friends(&self, radius: u32) -> usize {
        scanner::count_nearby_friends(self.grid, self.position, self.team, radius)
    }

    /// Direction of the closest enemy within `radius`, or neutral.
    #[must_use]
    pub fn nearest_enemy_direction(&self, radius: u32) -> Direction {
        scanner::nearest_enemy_direction(self.grid, self.position, self.team, radius)
    }

    /// Decide and carry out this turn.
    ///
    /// An attack is issued to the grid; a move only updates this soldier's
    /// own position.
    pub fn perform_turn(&mut self) -> TurnAction {
        let action = policy::decide(self.grid, self.position, self.team);

        match action {
            TurnAction::Attack { target, direction } => {
                tracing::debug!(team = %self.team, from = %self.position, %target, %direction, "Attack");
                self.grid.attack(target);
            }
            TurnAction::Move { to, direction, .. } => {
                tracing::debug!(team = %self.team, from = %self.position, %to, %direction, "Move");
                self.position = to;
            }
            TurnAction::Idle => {
                tracing::debug!(team = %self.team, at = %self.position, "Idle");
            }
        }

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::team::CellState;

    fn pos(row: i32, col: i32) -> GridPos {
        GridPos::new(row, col)
    }

    #[test]
    fn test_new_soldier_has_initial_health() {
        let grid = Arena::new(5, 5).unwrap();
        let soldier = Soldier::new(&grid, Team::Red, pos(0, 0));
        assert_eq!(soldier.health(), INITIAL_HEALTH);
        assert_eq!(soldier.team(), Team::Red);
        assert_eq!(soldier.position(), pos(0, 0));
        assert!(soldier.is_alive());
    }

    #[test]
    fn test_profile_sets_health() {
        let grid = Arena::new(2, 2).unwrap();
        let profile = SoldierProfile {
            initial_health: 3,
            ..SoldierProfile::BASIC
        };
        let soldier = Soldier::with_profile(&grid, Team::Blue, pos(1, 1), &profile);
        assert_eq!(soldier.health(), 3);
    }

    #[test]
    fn test_damage_saturates() {
        let grid = Arena::new(1, 1).unwrap();
        let mut soldier = Soldier::new(&grid, Team::Red, pos(0, 0));
        soldier.receive_damage(4);
        assert_eq!(soldier.health(), 6);
        soldier.receive_damage(100);
        assert_eq!(soldier.health(), 0);
        assert!(!soldier.is_alive());
    }

    #[test]
    fn test_attack_turn_issues_strike_and_stays() {
        let grid = Arena::from_ascii(
            ".....
             .....
             ..RB.
             .....
             .....",
        )
        .unwrap();
        let mut soldier = Soldier::new(&grid, Team::Red, pos(2, 2));
        assert_eq!(soldier.nearest_enemy_direction(1), Direction::Right);

        let action = soldier.perform_turn();
        assert!(matches!(action, TurnAction::Attack { .. }));
        assert_eq!(soldier.position(), pos(2, 2));
        assert_eq!(grid.take_strikes(), vec![pos(2, 3)]);
    }

    #[test]
    fn test_move_turn_updates_position_only() {
        let grid = Arena::from_ascii(
            "...
             .R.
             ...",
        )
        .unwrap();
        let mut soldier = Soldier::new(&grid, Team::Red, pos(1, 1));
        soldier.perform_turn();
        assert_eq!(soldier.position(), pos(1, 0));
        // occupancy is the host's to update
        assert_eq!(grid.get(pos(1, 1)), CellState::Occupied(Team::Red));
        assert!(grid.take_strikes().is_empty());
    }

    #[test]
    fn test_boxed_in_turn_changes_nothing() {
        let grid = Arena::from_ascii(
            ".R.
             RRR
             .R.",
        )
        .unwrap();
        let mut soldier = Soldier::new(&grid, Team::Red, pos(1, 1));
        assert!(!soldier.can_move());
        assert_eq!(soldier.perform_turn(), TurnAction::Idle);
        assert_eq!(soldier.position(), pos(1, 1));
        assert!(grid.take_strikes().is_empty());
    }

    #[test]
    fn test_queries_delegate_to_scans() {
        let grid = Arena::from_ascii(
            "R.R
             ..B
             B..",
        )
        .unwrap();
        let soldier = Soldier::new(&grid, Team::Red, pos(0, 0));
        assert_eq!(soldier.count_enemies_remaining(), 2);
        assert_eq!(soldier.nearest_friend_direction(), Direction::Right);
        assert_eq!(soldier.count_nearby_friends(1), 0);
        assert_eq!(soldier.count_nearby_friends(2), 1);
        assert_eq!(soldier.distance_to(pos(2, 2)), 4);
        assert_eq!(soldier.direction_to(pos(2, 0)), Direction::Down);
    }
}
