//! Batch game runner for balance testing.
//!
//! Runs many seeds of one scenario in parallel using rayon. Every worker
//! builds its own arena, so nothing grid-related crosses threads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::game_runner::{run_game, GameConfig};
use crate::metrics::{BatchSummary, GameMetrics};
use crate::scenario::{load_profile, Scenario, ScenarioError};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Built-in scenario name or path to a RON file
    pub scenario: String,
    /// Number of games to run
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Starting seed for deterministic runs
    pub seed_start: u64,
    /// Round cap per game (0 = the scenario's own)
    pub max_rounds: u64,
    /// Soldier profile override (RON file)
    pub profile_path: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "skirmish_small".to_string(),
            game_count: 100,
            parallel_games: 0,
            seed_start: 0,
            max_rounds: 0,
            profile_path: None,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    #[must_use]
    pub fn new(scenario: &str, game_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the per-game round cap
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual game metrics, in seed order
    pub games: Vec<GameMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total games
    pub total: u32,
    /// Completed games
    pub completed: Arc<AtomicU32>,
    /// Start time
    pub start_time: Instant,
    partial_wins: Arc<Mutex<HashMap<String, u32>>>,
}

impl BatchProgress {
    /// Create new progress tracker
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: Arc::new(AtomicU32::new(0)),
            start_time: Instant::now(),
            partial_wins: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a completed game
    pub fn record_completion(&self, winner: Option<&str>) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if let Some(w) = winner {
            if let Ok(mut wins) = self.partial_wins.lock() {
                *wins.entry(w.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Get current completion count
    #[must_use]
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Get estimated time remaining
    #[must_use]
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_game = elapsed.as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }

    /// Get current win rates
    #[must_use]
    pub fn current_win_rates(&self) -> HashMap<String, f64> {
        let completed = self.current();
        if completed == 0 {
            return HashMap::new();
        }

        self.partial_wins.lock().map_or_else(
            |_| HashMap::new(),
            |wins| {
                wins.iter()
                    .map(|(k, v)| (k.clone(), f64::from(*v) / f64::from(completed)))
                    .collect()
            },
        )
    }

    /// Display progress to stderr
    pub fn display(&self) {
        let completed = self.current();
        let eta = self.eta();
        let mut rates: Vec<_> = self.current_win_rates().into_iter().collect();
        rates.sort_by(|a, b| a.0.cmp(&b.0));

        eprintln!("╔════════════════════════════════════╗");
        eprintln!(
            "║ Batch Progress: {:>4}/{:<4} ({:>5.1}%) ║",
            completed,
            self.total,
            self.percentage()
        );
        eprintln!(
            "║ ETA: {:>29} ║",
            format!("{}m {}s", eta.as_secs() / 60, eta.as_secs() % 60)
        );
        if !rates.is_empty() {
            eprintln!("╟────────────────────────────────────╢");
            eprintln!("║ Win Rates So Far:                  ║");
            for (team, rate) in &rates {
                eprintln!("║   {:<12}: {:>5.1}%              ║", team, rate * 100.0);
            }
        }
        eprintln!("╚════════════════════════════════════╝");
    }
}

fn prepare_scenario(config: &BatchConfig) -> Result<Scenario, ScenarioError> {
    let mut scenario = Scenario::resolve(&config.scenario)?;

    if let Some(ref path) = config.profile_path {
        match load_profile(path) {
            Ok(profile) => {
                info!(path = %path.display(), ?profile, "Loaded soldier profile");
                scenario.profile = profile;
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load soldier profile, using scenario default"
                );
            }
        }
    }

    Ok(scenario)
}

fn run_single_game(scenario: &Scenario, seed: u64, max_rounds: u64) -> Result<GameMetrics, String> {
    let mut game_config = GameConfig::new(scenario.clone(), seed);
    game_config.max_rounds = max_rounds;
    run_game(game_config)
        .map(|result| result.metrics)
        .map_err(|e| e.to_string())
}

/// Run a batch of games.
///
/// Fails only when the scenario itself cannot be resolved; games that fail
/// individually are reported in [`BatchResults::errors`].
pub fn run_batch(config: BatchConfig) -> Result<BatchResults, ScenarioError> {
    let start = Instant::now();
    let scenario = prepare_scenario(&config)?;
    let progress = BatchProgress::new(config.game_count);

    info!(
        scenario = %scenario.name,
        games = config.game_count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameMetrics, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));

            match run_single_game(&scenario, seed, config.max_rounds) {
                Ok(metrics) => {
                    progress.record_completion(metrics.winner.as_deref());

                    let completed = progress.current();
                    if completed % 10 == 0 {
                        debug!(completed, total = config.game_count, "Batch progress");
                    }
                    if completed % 100 == 0 {
                        progress.display();
                    }

                    Ok(metrics)
                }
                Err(message) => {
                    warn!(game = i, seed, error = %message, "Game failed");
                    Err(BatchError {
                        game_index: i,
                        seed,
                        message,
                    })
                }
            }
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        games = games.len(),
        failed = errors.len(),
        duration_secs = format!("{duration_seconds:.2}"),
        "Batch complete"
    );

    Ok(BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    })
}

/// Verify determinism by running the same seed several times.
///
/// Every run must agree on the final state hash, the round count and the
/// winner.
pub fn verify_determinism(scenario: &str, seed: u64, runs: u32) -> Result<bool, ScenarioError> {
    let scenario = Scenario::resolve(scenario)?;
    let mut first: Option<GameMetrics> = None;

    for run in 0..runs.max(1) {
        let metrics = match run_single_game(&scenario, seed, 0) {
            Ok(metrics) => metrics,
            Err(message) => {
                warn!(run, seed, error = %message, "Verification run failed");
                return Ok(false);
            }
        };

        match &first {
            None => first = Some(metrics),
            Some(reference) => {
                if metrics.final_state_hash != reference.final_state_hash
                    || metrics.rounds != reference.rounds
                    || metrics.winner != reference.winner
                {
                    warn!(
                        run,
                        expected = reference.final_state_hash,
                        actual = metrics.final_state_hash,
                        "Run diverged"
                    );
                    return Ok(false);
                }
            }
        }
    }

    Ok(true)
}
