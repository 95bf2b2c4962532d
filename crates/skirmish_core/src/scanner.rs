//! Full-grid threat scans.
//!
//! Every scan visits each cell exactly once, rows outer and columns inner.
//! Nearest-cell scans keep a running best and only replace it on a strictly
//! smaller distance, so among equally distant cells the first one in
//! row-major order wins.

use crate::battlefield::BattleField;
use crate::spatial::{direction, distance, Direction, GridPos};
use crate::team::{CellState, Team};

/// Closest matching cell found by [`nearest_matching`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting {
    /// Where the match stands.
    pub pos: GridPos,
    /// Manhattan distance from the scan origin.
    pub distance: u32,
    /// Direction from the scan origin.
    pub direction: Direction,
}

/// Linear-scan argmin over the whole grid.
///
/// A cell is a candidate when `matches` accepts its state, it is not the
/// origin itself, and (with `radius` set) it lies within that distance.
pub fn nearest_matching<F, P>(
    grid: &F,
    origin: GridPos,
    radius: Option<u32>,
    matches: P,
) -> Option<Sighting>
where
    F: BattleField + ?Sized,
    P: Fn(CellState) -> bool,
{
    let mut best: Option<Sighting> = None;

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let pos = GridPos::new(row, col);
            if !matches(grid.get(pos)) {
                continue;
            }

            let d = distance(origin, pos);
            if d == 0 || radius.is_some_and(|r| d > r) {
                continue;
            }

            if best.map_or(true, |b| d < b.distance) {
                best = Some(Sighting {
                    pos,
                    distance: d,
                    direction: direction(origin, pos),
                });
            }
        }
    }

    best
}

/// Count cells matching `matches`, excluding the origin, optionally within `radius`.
pub fn count_matching<F, P>(grid: &F, origin: GridPos, radius: Option<u32>, matches: P) -> usize
where
    F: BattleField + ?Sized,
    P: Fn(CellState) -> bool,
{
    let mut count = 0;

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let pos = GridPos::new(row, col);
            let d = distance(origin, pos);
            if d != 0 && radius.map_or(true, |r| d <= r) && matches(grid.get(pos)) {
                count += 1;
            }
        }
    }

    count
}

/// Number of cells held by the team opposing `team`, anywhere on the grid.
pub fn count_enemies_remaining<F: BattleField + ?Sized>(grid: &F, team: Team) -> usize {
    let enemy = team.opponent();
    let mut count = 0;

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if grid.get(GridPos::new(row, col)).is_team(enemy) {
                count += 1;
            }
        }
    }

    count
}

/// Direction of the closest teammate anywhere on the grid, or neutral if none.
pub fn nearest_friend_direction<F: BattleField + ?Sized>(
    grid: &F,
    origin: GridPos,
    team: Team,
) -> Direction {
    nearest_matching(grid, origin, None, |cell| cell.is_team(team))
        .map_or(Direction::Neutral, |s| s.direction)
}

/// Teammates (excluding self) within `radius`.
pub fn count_nearby_friends<F: BattleField + ?Sized>(
    grid: &F,
    origin: GridPos,
    team: Team,
    radius: u32,
) -> usize {
    count_matching(grid, origin, Some(radius), |cell| cell.is_team(team))
}

/// Closest enemy within `radius`, if any.
pub fn nearest_enemy<F: BattleField + ?Sized>(
    grid: &F,
    origin: GridPos,
    team: Team,
    radius: u32,
) -> Option<Sighting> {
    let enemy = team.opponent();
    nearest_matching(grid, origin, Some(radius), |cell| cell.is_team(enemy))
}

/// Direction of the closest enemy within `radius`, or neutral if none.
pub fn nearest_enemy_direction<F: BattleField + ?Sized>(
    grid: &F,
    origin: GridPos,
    team: Team,
    radius: u32,
) -> Direction {
    nearest_enemy(grid, origin, team, radius).map_or(Direction::Neutral, |s| s.direction)
}
