//! Scenario-level determinism checks.
//!
//! Built-in scenarios must lay out the same arena for the same seed and play
//! out identically, whether run back to back or on parallel threads.

use skirmish_headless::{run_game, GameConfig, Scenario};
use skirmish_test_utils::determinism::{
    find_first_divergence, run_parallel_skirmishes, verify_snapshot_determinism,
};

#[test]
fn builtin_scenarios_agree_across_threads() {
    for name in Scenario::BUILTIN_NAMES {
        let scenario = Scenario::builtin(name).unwrap();
        let result = run_parallel_skirmishes(|| scenario.build_arena(11).unwrap(), 4, 60);
        assert!(
            result.is_deterministic(),
            "{name} diverged: {:?}",
            result.hashes
        );
    }
}

#[test]
fn generated_deployment_never_diverges() {
    let scenario = Scenario::skirmish_small();
    for seed in [0, 1, 99, u64::MAX] {
        assert_eq!(
            find_first_divergence(|| scenario.build_arena(seed).unwrap(), 80),
            None,
            "seed {seed}"
        );
    }
}

#[test]
fn snapshot_resume_matches_uninterrupted_battle() {
    let scenario = Scenario::line_battle();
    assert!(verify_snapshot_determinism(
        || scenario.build_arena(0).unwrap(),
        4,
        20
    ));
}

#[test]
fn run_game_hash_is_stable_per_seed() {
    let first = run_game(GameConfig::new(Scenario::skirmish_small(), 5)).unwrap();
    let again = run_game(GameConfig::new(Scenario::skirmish_small(), 5)).unwrap();
    assert_eq!(first.final_state_hash, again.final_state_hash);
    assert_eq!(first.metrics.rounds, again.metrics.rounds);
}
