//! Test fixtures and helpers.
//!
//! Maps are drawn with the arena glyphs: `.` empty, `#` obstacle, `R` red,
//! `B` blue. Leading whitespace on each line is ignored, so maps can be
//! indented inside test bodies.

use skirmish_core::arena::Arena;
use skirmish_core::battlefield::BattleField;
use skirmish_core::spatial::GridPos;
use skirmish_core::team::{CellState, Team};

/// Shorthand for a grid coordinate.
#[must_use]
pub fn pos(row: i32, col: i32) -> GridPos {
    GridPos::new(row, col)
}

/// Build an arena from an ASCII map.
///
/// # Panics
///
/// Panics if the map is malformed. Test setup only.
#[must_use]
pub fn arena(map: &str) -> Arena {
    match Arena::from_ascii(map) {
        Ok(arena) => arena,
        Err(e) => panic!("bad fixture map: {e}\n{map}"),
    }
}

/// 5x5 grid with red at (2, 2) and blue at (2, 3).
pub const DUEL_5X5: &str = "
    .....
    .....
    ..RB.
    .....
    .....
";

/// 5x5 grid with a lone red soldier in the top-left corner.
pub const LONE_CORNER_5X5: &str = "
    R....
    .....
    .....
    .....
    .....
";

/// Red at (2, 2) boxed in by teammates on every cardinal side.
pub const BOXED_IN: &str = "
    .....
    ..R..
    .RRR.
    ..R..
    .....
";

/// Red at (2, 2) with blue at (0, 2) and (4, 2), both at distance 2.
pub const EQUIDISTANT_ENEMIES: &str = "
    ..B..
    .....
    ..R..
    .....
    ..B..
";

/// Two lines facing each other across open ground.
pub const LINE_BATTLE: &str = "
    R.......B
    R.......B
    R...#...B
    R.......B
    R.......B
";

/// Count cells held by `team` with a plain loop, independent of the scanner.
#[must_use]
pub fn independent_count(arena: &Arena, team: Team) -> usize {
    let mut count = 0;
    for row in 0..arena.rows() {
        for col in 0..arena.cols() {
            if arena.get(pos(row, col)) == CellState::Occupied(team) {
                count += 1;
            }
        }
    }
    count
}
