//! Headless skirmish runner.
//!
//! Plays grid battles without an interactive front end. Designed for balance
//! sweeps, CI determinism checks and quick looks at a scenario.
//!
//! # Usage
//!
//! ```bash
//! # Play one battle and print the final grid
//! cargo run -p skirmish_headless -- run --scenario line_battle
//!
//! # Print every round, or the metrics as JSON
//! cargo run -p skirmish_headless -- run --scenario skirmish_small --seed 3 --frames
//! cargo run -p skirmish_headless -- run --scenario skirmish_small --json
//!
//! # Run batch balance test
//! cargo run -p skirmish_headless -- batch --scenario skirmish_small --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p skirmish_headless -- verify --scenario skirmish_small --seed 12345 --runs 5
//!
//! # Show a scenario's starting layout
//! cargo run -p skirmish_headless -- show --scenario skirmish_small --seed 9
//! ```
//!
//! Results go to stdout, logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_headless::{
    ascii_visualizer::{render_ascii, render_battle_progress, AsciiConfig},
    batch::{run_batch, verify_determinism, BatchConfig},
    game_runner::{run_game, GameConfig},
    scenario::{load_profile, Scenario},
};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless grid skirmish runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single battle
    Run {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "skirmish_small")]
        scenario: String,

        /// Deployment seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Round cap (0 = the scenario's own)
        #[arg(long, default_value = "0")]
        max_rounds: u64,

        /// Soldier profile override (RON file)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Print the grid after every round
        #[arg(long)]
        frames: bool,

        /// Print metrics as JSON instead of the grid
        #[arg(long, conflicts_with = "frames")]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Run batch of battles for balance testing
    Batch {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "skirmish_small")]
        scenario: String,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Round cap per game (0 = the scenario's own)
        #[arg(long, default_value = "0")]
        max_rounds: u64,

        /// Soldier profile override (RON file)
        #[arg(long)]
        profile: Option<PathBuf>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario to test
        #[arg(short, long, default_value = "skirmish_small")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Show a scenario's starting layout
    Show {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "skirmish_small")]
        scenario: String,

        /// Deployment seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            seed,
            max_rounds,
            profile,
            frames,
            json,
            no_color,
        } => cmd_run(&scenario, seed, max_rounds, profile, frames, json, no_color),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            max_rounds,
            profile,
        } => cmd_batch(scenario, count, parallel, output, seed, max_rounds, profile),
        Commands::Verify {
            scenario,
            seed,
            runs,
        } => cmd_verify(&scenario, seed, runs),
        Commands::Show {
            scenario,
            seed,
            no_color,
        } => cmd_show(&scenario, seed, no_color),
    }
}

fn load_scenario(name: &str) -> Scenario {
    match Scenario::resolve(name) {
        Ok(scenario) => scenario,
        Err(e) => {
            tracing::error!(scenario = %name, error = %e, "Failed to load scenario");
            eprintln!("FATAL: Cannot load scenario '{name}': {e}");
            eprintln!("Built-in scenarios: {}", Scenario::BUILTIN_NAMES.join(", "));
            std::process::exit(1);
        }
    }
}

/// Play a single battle
fn cmd_run(
    scenario: &str,
    seed: u64,
    max_rounds: u64,
    profile: Option<PathBuf>,
    frames: bool,
    json: bool,
    no_color: bool,
) {
    let mut scenario = load_scenario(scenario);
    if let Some(path) = profile {
        match load_profile(&path) {
            Ok(p) => scenario.profile = p,
            Err(e) => {
                eprintln!("FATAL: Cannot load profile '{}': {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    let before = match scenario.build_arena(seed) {
        Ok(arena) => arena,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    let mut config = GameConfig::new(scenario, seed);
    config.max_rounds = max_rounds;
    config.record_frames = frames;

    let result = match run_game(config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&result.metrics) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("FATAL: Failed to encode metrics: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    for (round, frame) in result.frames.iter().enumerate() {
        println!("Round {}", round + 1);
        println!("{frame}");
    }

    let ascii = AsciiConfig {
        use_color: !no_color,
        ..Default::default()
    };
    println!("{}", result.final_render);
    match result.final_snapshot.to_arena() {
        Ok(after) => print!("{}", render_battle_progress(&before, &after, &ascii)),
        Err(e) => tracing::warn!(error = %e, "Could not rebuild final arena"),
    }

    println!(
        "\nOutcome: {} after {} rounds",
        result.metrics.outcome, result.metrics.rounds
    );
    if let Some(winner) = &result.metrics.winner {
        println!("Winner: {winner}");
    }
    println!("State hash: {:016x}", result.final_state_hash);
}

/// Run batch of battles for balance testing
fn cmd_batch(
    scenario: String,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_rounds: u64,
    profile: Option<PathBuf>,
) {
    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        scenario = %scenario,
        count,
        parallel,
        seed,
        max_rounds,
        output = %output.display(),
        cpus_available = num_cpus,
        profile = ?profile,
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        std::process::exit(1);
    }

    let config = BatchConfig {
        scenario,
        game_count: count,
        parallel_games: parallel,
        seed_start: seed,
        max_rounds,
        profile_path: profile,
    };

    let results = match run_batch(config) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {e}");
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput: {:.1} games/sec",
        results.games.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!(
        "Rounds: avg {:.1}, min {}, max {}",
        summary.avg_rounds, summary.min_rounds, summary.max_rounds
    );
    eprintln!(
        "Stalemates: {}  Timeouts: {}",
        summary.stalemates, summary.timeouts
    );
    eprintln!("\nWin Rates:");
    let mut rates: Vec<_> = summary.win_rates.iter().collect();
    rates.sort_by(|a, b| a.0.cmp(b.0));
    for (team, rate) in rates {
        eprintln!("  {}: {:.1}%", team, rate * 100.0);
    }
    if let Some(team) = summary.dominant_team(0.1) {
        eprintln!("\nImbalance: {team} wins more than 60% of games");
    }

    if !results.errors.is_empty() {
        eprintln!("\nGAME FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Game {} (seed {}): {}",
                error.game_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: u32) {
    tracing::info!(scenario, seed, runs, "Verifying determinism");

    match verify_determinism(scenario, seed, runs) {
        Ok(true) => eprintln!("PASS: All {runs} runs produced identical results"),
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

/// Show a scenario's starting layout
fn cmd_show(scenario: &str, seed: u64, no_color: bool) {
    let scenario = load_scenario(scenario);
    let arena = match scenario.build_arena(seed) {
        Ok(arena) => arena,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    println!("{} ({}x{})", scenario.name, scenario.rows, scenario.cols);
    if !scenario.description.is_empty() {
        println!("{}", scenario.description);
    }
    let config = AsciiConfig {
        use_color: !no_color,
        ..Default::default()
    };
    print!("{}", render_ascii(&arena, &config));
}
