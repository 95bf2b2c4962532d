//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical results
//! given an identical starting grid.
//!
//! # Testing Strategy
//!
//! A battle must replay exactly. Sources of non-determinism include:
//!
//! - **Iteration order**: turns go by ascending soldier id, scans go
//!   row-major. Nothing iterates a `HashMap`.
//!
//! - **Tie-breaking**: nearest-cell scans keep the first cell at the
//!   minimum distance. Any change there changes who gets hit.
//!
//! - **System randomness**: none in the core. Seeded deployment lives in the
//!   headless runner.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: per-module behaviour
//! 2. **Property tests**: random maps must still play out deterministically
//! 3. **Parallel tests**: running N battles on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skirmish_core::arena::Arena;
use skirmish_core::data::SoldierProfile;
use skirmish_core::simulation::{BattleSnapshot, Skirmish};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of rounds played.
    pub rounds: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Rounds: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.rounds,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one step
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        rounds: steps,
    }
}

/// Muster every soldier on a fresh arena from `setup_fn`, play `rounds`
/// rounds, and return the final state hash.
///
/// # Panics
///
/// Panics if a round fails; fixture arenas are expected to be consistent.
pub fn play_and_hash<F>(setup_fn: &F, rounds: u64) -> u64
where
    F: Fn() -> Arena,
{
    let arena = setup_fn();
    let mut battle = Skirmish::muster(&arena, SoldierProfile::default());
    for _ in 0..rounds {
        if let Err(e) = battle.play_round() {
            panic!("round {} failed: {e}", battle.round() + 1);
        }
    }
    battle.state_hash()
}

/// Play the same starting arena twice and compare final hashes.
pub fn verify_skirmish_determinism<F>(setup_fn: F, rounds: u64) -> bool
where
    F: Fn() -> Arena,
{
    let first = play_and_hash(&setup_fn, rounds);
    let second = play_and_hash(&setup_fn, rounds);
    first == second
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each battle.
    pub hashes: Vec<u64>,
    /// Number of rounds each battle played.
    pub rounds: u64,
    /// Number of battles run.
    pub num_runs: usize,
}

impl ParallelRunResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run N battles on scoped threads and collect final hashes.
///
/// Each thread builds its own arena; arenas are never shared across threads.
pub fn run_parallel_skirmishes<F>(setup_fn: F, num_runs: usize, rounds: u64) -> ParallelRunResult
where
    F: Fn() -> Arena + Sync,
{
    let setup_ref = &setup_fn;
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| s.spawn(move || play_and_hash(setup_ref, rounds)))
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(hash) => hash,
                Err(_) => panic!("battle thread panicked"),
            })
            .collect()
    });

    ParallelRunResult {
        hashes,
        rounds,
        num_runs,
    }
}

/// Compare two runs round-by-round, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(round)` at the first round
/// whose hashes differ (0 means the starting states already differ).
pub fn find_first_divergence<F>(setup_fn: F, rounds: u64) -> Option<u64>
where
    F: Fn() -> Arena,
{
    let arena1 = setup_fn();
    let arena2 = setup_fn();
    let mut battle1 = Skirmish::muster(&arena1, SoldierProfile::default());
    let mut battle2 = Skirmish::muster(&arena2, SoldierProfile::default());

    if battle1.state_hash() != battle2.state_hash() {
        return Some(0);
    }

    for round in 1..=rounds {
        let ok1 = battle1.play_round().is_ok();
        let ok2 = battle2.play_round().is_ok();

        if ok1 != ok2 || battle1.state_hash() != battle2.state_hash() {
            tracing::warn!(round, "Battles diverged");
            return Some(round);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves battle state exactly, and
/// that the restored battle keeps matching the original for `rounds_after`.
pub fn verify_snapshot_determinism<F>(setup_fn: F, rounds_before: u64, rounds_after: u64) -> bool
where
    F: Fn() -> Arena,
{
    let arena = setup_fn();
    let mut battle = Skirmish::muster(&arena, SoldierProfile::default());
    for _ in 0..rounds_before {
        if battle.play_round().is_err() {
            return false;
        }
    }

    let Ok(bytes) = battle.snapshot().to_bytes() else {
        return false;
    };
    let Ok(snapshot) = BattleSnapshot::from_bytes(&bytes) else {
        return false;
    };
    let Ok(restored_arena) = snapshot.to_arena() else {
        return false;
    };
    let Ok(mut restored) = Skirmish::resume(&restored_arena, &snapshot, SoldierProfile::default())
    else {
        return false;
    };

    if restored.state_hash() != battle.state_hash() {
        return false;
    }

    for _ in 0..rounds_after {
        if battle.play_round().is_err() || restored.play_round().is_err() {
            return false;
        }
        if restored.state_hash() != battle.state_hash() {
            return false;
        }
    }

    true
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible grids and coordinates.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::spatial::GridPos;

    /// Generate a coordinate inside a `rows` x `cols` grid.
    pub fn arb_grid_pos(rows: i32, cols: i32) -> impl Strategy<Value = GridPos> {
        (0..rows, 0..cols).prop_map(|(row, col)| GridPos::new(row, col))
    }

    /// Generate a coordinate anywhere in a generous signed range.
    pub fn arb_any_pos() -> impl Strategy<Value = GridPos> {
        (-100i32..100, -100i32..100).prop_map(|(row, col)| GridPos::new(row, col))
    }

    /// Generate a single map glyph, weighted toward empty ground.
    pub fn arb_glyph() -> impl Strategy<Value = char> {
        prop_oneof![
            6 => Just('.'),
            1 => Just('#'),
            2 => Just('R'),
            2 => Just('B'),
        ]
    }

    /// Generate an ASCII map of exactly `rows` x `cols`.
    pub fn arb_map(rows: usize, cols: usize) -> impl Strategy<Value = String> {
        proptest::collection::vec(arb_glyph(), rows * cols).prop_map(move |glyphs| {
            glyphs
                .chunks(cols)
                .map(|row| row.iter().collect::<String>())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    /// Generate an ASCII map between 1x1 and `max` x `max`.
    pub fn arb_sized_map(max: usize) -> impl Strategy<Value = String> {
        (1..=max, 1..=max).prop_flat_map(|(rows, cols)| arb_map(rows, cols))
    }
}
