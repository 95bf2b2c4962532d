//! Seeded deployment generator.
//!
//! Produces starting positions for both teams from a seed, so batch runs can
//! sweep many layouts while any single game stays reproducible.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use skirmish_core::spatial::GridPos;
use skirmish_core::team::Team;

/// How soldiers are spread over the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeployPattern {
    /// Red on the left quarter, blue on the right quarter.
    #[default]
    Flanks,
    /// Both teams anywhere, interleaved.
    Scattered,
}

/// Simple deterministic RNG for deployments.
#[derive(Debug, Clone)]
pub struct DeployRng {
    state: u64,
}

impl DeployRng {
    /// Create new RNG from seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Get next random value.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }

    /// Get a value in `0..bound`. Returns 0 when `bound` is 0.
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        // Low bits of this LCG cycle quickly.
        ((self.next() >> 33) % bound as u64) as usize
    }
}

/// Generate `per_team` starting positions for each team on an open grid.
#[must_use]
pub fn generate_deployment(
    seed: u64,
    rows: i32,
    cols: i32,
    per_team: u32,
    pattern: DeployPattern,
) -> Vec<(Team, GridPos)> {
    generate_deployment_avoiding(seed, rows, cols, per_team, pattern, &[])
}

/// Generate starting positions that never land on `blocked`.
///
/// Positions never collide. When a side has fewer free cells than
/// `per_team`, it gets as many as fit. Output is red first, then blue, each
/// in row-major order.
#[must_use]
pub fn generate_deployment_avoiding(
    seed: u64,
    rows: i32,
    cols: i32,
    per_team: u32,
    pattern: DeployPattern,
    blocked: &[GridPos],
) -> Vec<(Team, GridPos)> {
    let mut rng = DeployRng::new(seed);
    let mut taken: HashSet<GridPos> = blocked.iter().copied().collect();
    let wanted = per_team as usize;

    let (red, blue) = match pattern {
        DeployPattern::Flanks => {
            let band = (cols / 4).max(1);
            let red_cells = free_cells(rows, cols, &taken, |pos| pos.col < band);
            let red = pick(&mut rng, red_cells, wanted);
            taken.extend(red.iter().copied());

            let blue_cells = free_cells(rows, cols, &taken, |pos| pos.col >= cols - band);
            let blue = pick(&mut rng, blue_cells, wanted);
            (red, blue)
        }
        DeployPattern::Scattered => {
            let cells = free_cells(rows, cols, &taken, |_| true);
            let chosen = pick(&mut rng, cells, wanted * 2);
            let mut red = Vec::new();
            let mut blue = Vec::new();
            for (i, pos) in chosen.into_iter().enumerate() {
                if i % 2 == 0 {
                    red.push(pos);
                } else {
                    blue.push(pos);
                }
            }
            (red, blue)
        }
    };

    if red.len() < wanted || blue.len() < wanted {
        tracing::warn!(
            rows,
            cols,
            per_team,
            red = red.len(),
            blue = blue.len(),
            "Not enough room for full deployment"
        );
    }

    let mut deployment = Vec::with_capacity(red.len() + blue.len());
    deployment.extend(sorted(red).into_iter().map(|pos| (Team::Red, pos)));
    deployment.extend(sorted(blue).into_iter().map(|pos| (Team::Blue, pos)));
    deployment
}

fn free_cells<P>(rows: i32, cols: i32, taken: &HashSet<GridPos>, keep: P) -> Vec<GridPos>
where
    P: Fn(GridPos) -> bool,
{
    let mut cells = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let pos = GridPos::new(row, col);
            if keep(pos) && !taken.contains(&pos) {
                cells.push(pos);
            }
        }
    }
    cells
}

/// Partial Fisher-Yates: the first `count` cells of a seeded shuffle.
fn pick(rng: &mut DeployRng, mut cells: Vec<GridPos>, count: usize) -> Vec<GridPos> {
    let count = count.min(cells.len());
    for i in 0..count {
        let j = i + rng.next_below(cells.len() - i);
        cells.swap(i, j);
    }
    cells.truncate(count);
    cells
}

fn sorted(mut cells: Vec<GridPos>) -> Vec<GridPos> {
    cells.sort_unstable();
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeployRng::new(12345);
        let mut rng2 = DeployRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next(), rng2.next());
        }
    }

    #[test]
    fn test_next_below_stays_in_range() {
        let mut rng = DeployRng::new(7);
        for bound in 1..50 {
            assert!(rng.next_below(bound) < bound);
        }
        assert_eq!(rng.next_below(0), 0);
    }

    #[test]
    fn test_same_seed_same_deployment() {
        let a = generate_deployment(99, 8, 8, 4, DeployPattern::Scattered);
        let b = generate_deployment(99, 8, 8, 4, DeployPattern::Scattered);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeds_vary_layout() {
        let layouts: HashSet<Vec<(Team, GridPos)>> = (0..6)
            .map(|seed| generate_deployment(seed, 10, 10, 5, DeployPattern::Flanks))
            .collect();
        assert!(layouts.len() > 1);
    }

    #[test]
    fn test_flanks_keep_teams_apart() {
        let deployment = generate_deployment(3, 8, 12, 6, DeployPattern::Flanks);
        assert_eq!(deployment.len(), 12);
        for (team, pos) in deployment {
            match team {
                Team::Red => assert!(pos.col < 3, "red at {pos}"),
                Team::Blue => assert!(pos.col >= 9, "blue at {pos}"),
            }
        }
    }

    #[test]
    fn test_positions_never_collide() {
        for pattern in [DeployPattern::Flanks, DeployPattern::Scattered] {
            let deployment = generate_deployment(11, 6, 6, 8, pattern);
            let unique: HashSet<GridPos> = deployment.iter().map(|&(_, p)| p).collect();
            assert_eq!(unique.len(), deployment.len());
            for (_, pos) in &deployment {
                assert!(pos.row >= 0 && pos.row < 6 && pos.col >= 0 && pos.col < 6);
            }
        }
    }

    #[test]
    fn test_blocked_cells_are_avoided() {
        let blocked: Vec<GridPos> = (0..4).map(|row| GridPos::new(row, 0)).collect();
        let deployment =
            generate_deployment_avoiding(5, 4, 8, 4, DeployPattern::Flanks, &blocked);
        for (_, pos) in &deployment {
            assert!(!blocked.contains(pos));
        }
    }

    #[test]
    fn test_small_grid_truncates() {
        // One column: both flanks share it.
        let deployment = generate_deployment(1, 3, 1, 5, DeployPattern::Flanks);
        assert_eq!(deployment.len(), 3);
        let red = deployment.iter().filter(|(t, _)| *t == Team::Red).count();
        assert_eq!(red, 3);
    }
}
