//! Single game execution for headless testing.
//!
//! Builds the scenario's arena for a seed, musters every soldier on it, and
//! plays rounds until the battle is decided or the round cap is hit,
//! collecting metrics along the way.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use skirmish_core::error::GameError;
use skirmish_core::simulation::{BattleSnapshot, Outcome, Skirmish};
use skirmish_core::team::Team;

use crate::ascii_visualizer::{render_skirmish, AsciiConfig};
use crate::metrics::{GameMetrics, MetricsCollector};
use crate::scenario::{Scenario, ScenarioError};

/// Progress logging interval (rounds).
const PROGRESS_LOG_INTERVAL: u64 = 50;

/// Error from [`run_game`].
#[derive(Error, Debug)]
pub enum GameRunError {
    /// The scenario could not be laid out.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// The battle reached an inconsistent state.
    #[error("Game '{game_id}' failed in round {round}: {source}")]
    Battle {
        /// Game identifier.
        game_id: String,
        /// Round being played.
        round: u64,
        /// Underlying error.
        #[source]
        source: GameError,
    },
}

/// Configuration for a single game run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Deployment seed.
    pub seed: u64,
    /// Round cap; 0 uses the scenario's own.
    pub max_rounds: u64,
    /// Scenario to use.
    pub scenario: Scenario,
    /// Game ID for tracking.
    pub game_id: String,
    /// Keep a rendering of the grid after every round.
    pub record_frames: bool,
}

impl GameConfig {
    /// Config for `scenario` with `seed` and the scenario's round cap.
    #[must_use]
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        Self {
            seed,
            max_rounds: 0,
            game_id: format!("{}_{}", scenario.name, seed),
            scenario,
            record_frames: false,
        }
    }

    fn round_cap(&self) -> u64 {
        if self.max_rounds > 0 {
            self.max_rounds
        } else {
            self.scenario.max_rounds
        }
    }
}

/// Result of running a game.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Collected metrics, including the outcome.
    pub metrics: GameMetrics,
    /// How the battle ended.
    pub outcome: Outcome,
    /// Final battle state hash.
    pub final_state_hash: u64,
    /// Plain rendering of the final grid.
    pub final_render: String,
    /// Final battle state, for rebuilding the arena afterwards.
    pub final_snapshot: BattleSnapshot,
    /// One rendering per round, when requested.
    pub frames: Vec<String>,
}

/// Run a complete game.
pub fn run_game(config: GameConfig) -> Result<GameResult, GameRunError> {
    let game_start = Instant::now();
    let max_rounds = config.round_cap();
    info!(
        game_id = %config.game_id,
        seed = config.seed,
        max_rounds,
        scenario = %config.scenario.name,
        "Starting game"
    );

    let arena = config.scenario.build_arena(config.seed)?;
    let mut battle = Skirmish::muster(&arena, config.scenario.profile);

    let mut collector = MetricsCollector::new(&config.game_id, &config.scenario.name, config.seed);
    for (id, soldier) in battle.soldiers() {
        collector.on_enlisted(id, soldier.team());
    }

    let frame_config = AsciiConfig::plain();
    let mut frames = Vec::new();
    let mut last_round = 0;

    let result = battle.run_with(max_rounds, |report| {
        last_round = report.round;
        collector.on_round(report);
        if report.round % PROGRESS_LOG_INTERVAL == 0 {
            debug!(round = report.round, turns = report.turns.len(), "Game progress");
        }
        if config.record_frames {
            frames.push(arena.render());
        }
    });
    let result = result.map_err(|source| GameRunError::Battle {
        game_id: config.game_id.clone(),
        round: last_round + 1,
        source,
    })?;

    let final_state_hash = battle.state_hash();
    let metrics = collector.finalize(result.rounds, result.outcome, final_state_hash);

    info!(
        game_id = %config.game_id,
        outcome = ?result.outcome,
        rounds = result.rounds,
        red = battle.strength(Team::Red),
        blue = battle.strength(Team::Blue),
        state_hash = final_state_hash,
        elapsed_ms = game_start.elapsed().as_millis() as u64,
        "Game finished"
    );

    Ok(GameResult {
        metrics,
        outcome: result.outcome,
        final_state_hash,
        final_render: render_skirmish(&battle, &frame_config),
        final_snapshot: battle.snapshot(),
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_game_deterministic() {
        let result1 = run_game(GameConfig::new(Scenario::skirmish_small(), 12345)).unwrap();
        let result2 = run_game(GameConfig::new(Scenario::skirmish_small(), 12345)).unwrap();

        assert_eq!(result1.metrics.winner, result2.metrics.winner);
        assert_eq!(result1.metrics.rounds, result2.metrics.rounds);
        assert_eq!(result1.final_state_hash, result2.final_state_hash);
        assert_eq!(result1.final_render, result2.final_render);
        assert_eq!(result1.final_snapshot, result2.final_snapshot);
    }

    #[test]
    fn test_game_respects_round_cap() {
        let mut config = GameConfig::new(Scenario::line_battle(), 0);
        config.max_rounds = 1;
        let result = run_game(config).unwrap();

        assert!(result.metrics.rounds <= 1);
    }

    #[test]
    fn test_duel_scenario() {
        let scenario = Scenario::from_ron_str(
            r#"Scenario(
                name: "duel",
                rows: 5,
                cols: 5,
                deployments: Fixed([
                    Placement(team: Red, position: (2, 2)),
                    Placement(team: Blue, position: (2, 3)),
                ]),
            )"#,
        )
        .unwrap();

        let result = run_game(GameConfig::new(scenario, 0)).unwrap();
        assert_eq!(result.outcome, Outcome::Victory(Team::Red));
        assert_eq!(result.metrics.rounds, 3);

        let red = result.metrics.team(Team::Red).unwrap();
        assert_eq!(red.attacks, 3);
        assert_eq!(red.kills, 1);
        assert_eq!(red.damage_taken, 8);
        let blue = result.metrics.team(Team::Blue).unwrap();
        assert_eq!(blue.attacks, 2);
        assert_eq!(blue.losses, 1);

        let after = result.final_snapshot.to_arena().unwrap();
        assert_eq!(after.render(), ".....\n.....\n..R..\n.....\n.....\n");
    }

    #[test]
    fn test_frames_recorded_per_round() {
        let mut config = GameConfig::new(Scenario::skirmish_small(), 3);
        config.record_frames = true;
        config.max_rounds = 5;
        let result = run_game(config).unwrap();

        assert_eq!(result.frames.len() as u64, result.metrics.rounds);
        for frame in &result.frames {
            assert_eq!(frame.lines().count(), 8);
        }
    }

    #[test]
    fn test_invalid_scenario_reports_error() {
        let mut scenario = Scenario::line_battle();
        scenario.rows = 0;
        assert!(matches!(
            run_game(GameConfig::new(scenario, 0)),
            Err(GameRunError::Scenario(_))
        ));
    }
}
