//! Headless battle runner for balance testing and CI verification.
//!
//! Plays skirmishes without any interactive front end:
//!
//! - **Scenarios**: Built-in layouts or RON files describing the grid,
//!   obstacles and how each team deploys
//! - **Batch runs**: Many seeds in parallel with aggregated win rates
//! - **Determinism checks**: Same seed, same hash, every time
//!
//! Results go to stdout (text or JSON) and logs go to stderr.
//!
//! # Example
//!
//! ```bash
//! # Play one battle and show the final grid
//! cargo run -p skirmish_headless -- run --scenario line_battle
//!
//! # Run a batch balance test
//! cargo run -p skirmish_headless -- batch --scenario skirmish_small --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p skirmish_headless -- verify --scenario skirmish_small --seed 7
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii_visualizer;
pub mod batch;
pub mod game_runner;
pub mod metrics;
pub mod scenario;
pub mod spawn_generator;

pub use ascii_visualizer::{render_ascii, render_battle_progress, render_skirmish, AsciiConfig};
pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use game_runner::{run_game, GameConfig, GameResult, GameRunError};
pub use metrics::{BatchSummary, GameMetrics, MetricsCollector};
pub use scenario::{load_profile, Deployment, Placement, Scenario, ScenarioError};
pub use spawn_generator::{generate_deployment, DeployPattern};
