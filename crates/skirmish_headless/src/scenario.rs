//! Scenario loading and configuration.
//!
//! Scenarios define the starting grid for headless games: its size, the
//! obstacles on it, where each team deploys, and the soldiers' stat block.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::arena::Arena;
use skirmish_core::data::SoldierProfile;
use skirmish_core::error::GameError;
use skirmish_core::spatial::GridPos;
use skirmish_core::team::Team;

use crate::spawn_generator::{generate_deployment_avoiding, DeployPattern};

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario does not fit on its own grid.
    #[error("Invalid scenario '{name}': {source}")]
    Invalid {
        /// Scenario name.
        name: String,
        /// What went wrong while laying it out.
        #[source]
        source: GameError,
    },
    /// Soldier profile could not be loaded.
    #[error("Failed to load soldier profile: {0}")]
    Profile(#[source] GameError),
}

/// One soldier placed by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Team.
    pub team: Team,
    /// (row, col).
    pub position: (i32, i32),
}

impl Placement {
    /// Create a new placement.
    #[must_use]
    pub const fn new(team: Team, row: i32, col: i32) -> Self {
        Self {
            team,
            position: (row, col),
        }
    }
}

/// Where soldiers start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deployment {
    /// Exactly these cells.
    Fixed(Vec<Placement>),
    /// Drawn from the game seed.
    Generated {
        /// Soldiers per team.
        per_team: u32,
        /// Spread.
        pattern: DeployPattern,
    },
}

/// A complete scenario configuration.
///
/// # Example RON
///
/// ```ron
/// Scenario(
///     name: "Corridor",
///     description: "Two squads and a wall",
///     rows: 6,
///     cols: 10,
///     obstacles: [(2, 5), (3, 5)],
///     deployments: Generated(per_team: 4, pattern: Flanks),
///     max_rounds: 150,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Grid height.
    pub rows: i32,
    /// Grid width.
    pub cols: i32,
    /// Obstacle cells as (row, col).
    #[serde(default)]
    pub obstacles: Vec<(i32, i32)>,
    /// Starting positions.
    pub deployments: Deployment,
    /// Round cap before a game is called a timeout.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u64,
    /// Stat block shared by every soldier.
    #[serde(default)]
    pub profile: SoldierProfile,
}

/// Default round cap.
const fn default_max_rounds() -> u64 {
    200
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish_small()
    }
}

impl Scenario {
    /// Names accepted by [`Scenario::builtin`].
    pub const BUILTIN_NAMES: [&'static str; 2] = ["skirmish_small", "line_battle"];

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    ///
    /// The embedded soldier profile is validated too.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario
            .profile
            .validate(&scenario.name)
            .map_err(ScenarioError::Profile)?;
        Ok(scenario)
    }

    /// Look up a built-in scenario by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "skirmish_small" => Some(Self::skirmish_small()),
            "line_battle" => Some(Self::line_battle()),
            _ => None,
        }
    }

    /// A built-in name, or else a path to a RON file.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        match Self::builtin(name_or_path) {
            Some(scenario) => Ok(scenario),
            None => Self::load(name_or_path),
        }
    }

    /// 8x8 grid, four soldiers a side on the flanks, a small wall mid-field.
    #[must_use]
    pub fn skirmish_small() -> Self {
        Self {
            name: "skirmish_small".to_string(),
            description: "Four a side on an 8x8 field with a short wall".to_string(),
            rows: 8,
            cols: 8,
            obstacles: vec![(3, 4), (4, 4)],
            deployments: Deployment::Generated {
                per_team: 4,
                pattern: DeployPattern::Flanks,
            },
            max_rounds: default_max_rounds(),
            profile: SoldierProfile::BASIC,
        }
    }

    /// Two full columns facing each other across a 5x9 field.
    #[must_use]
    pub fn line_battle() -> Self {
        let mut placements = Vec::new();
        for row in 0..5 {
            placements.push(Placement::new(Team::Red, row, 0));
            placements.push(Placement::new(Team::Blue, row, 8));
        }
        Self {
            name: "line_battle".to_string(),
            description: "Two lines of five with a pillar in the middle".to_string(),
            rows: 5,
            cols: 9,
            obstacles: vec![(2, 4)],
            deployments: Deployment::Fixed(placements),
            max_rounds: default_max_rounds(),
            profile: SoldierProfile::BASIC,
        }
    }

    /// Lay the scenario out on a fresh arena. `seed` only matters for
    /// generated deployments.
    pub fn build_arena(&self, seed: u64) -> Result<Arena, ScenarioError> {
        self.try_build_arena(seed)
            .map_err(|source| ScenarioError::Invalid {
                name: self.name.clone(),
                source,
            })
    }

    fn try_build_arena(&self, seed: u64) -> Result<Arena, GameError> {
        let arena = Arena::new(self.rows, self.cols)?;
        let obstacles: Vec<GridPos> = self.obstacles.iter().map(|&p| GridPos::from(p)).collect();
        for &pos in &obstacles {
            arena.set_obstacle(pos)?;
        }

        match &self.deployments {
            Deployment::Fixed(placements) => {
                for placement in placements {
                    arena.place(GridPos::from(placement.position), placement.team)?;
                }
            }
            Deployment::Generated { per_team, pattern } => {
                let deployment = generate_deployment_avoiding(
                    seed, self.rows, self.cols, *per_team, *pattern, &obstacles,
                );
                for (team, pos) in deployment {
                    arena.place(pos, team)?;
                }
            }
        }

        tracing::debug!(
            scenario = %self.name,
            seed,
            red = arena.count(skirmish_core::team::CellState::Occupied(Team::Red)),
            blue = arena.count(skirmish_core::team::CellState::Occupied(Team::Blue)),
            "Arena built"
        );
        Ok(arena)
    }
}

/// Load a soldier profile from a RON file.
pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<SoldierProfile, ScenarioError> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| {
        ScenarioError::Profile(GameError::DataRead {
            path: source.clone(),
            source: e,
        })
    })?;
    SoldierProfile::from_ron_str(&source, &text).map_err(ScenarioError::Profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::battlefield::BattleField;
    use skirmish_core::team::CellState;

    #[test]
    fn test_default_scenario() {
        let scenario = Scenario::default();
        assert_eq!(scenario.name, "skirmish_small");
        assert_eq!(scenario.profile, SoldierProfile::BASIC);
    }

    #[test]
    fn test_builtins_resolve() {
        for name in Scenario::BUILTIN_NAMES {
            let scenario = Scenario::resolve(name).unwrap();
            assert_eq!(scenario.name, name);
            scenario.build_arena(0).unwrap();
        }
    }

    #[test]
    fn test_line_battle_layout() {
        let arena = Scenario::line_battle().build_arena(0).unwrap();
        assert_eq!(arena.count(CellState::Occupied(Team::Red)), 5);
        assert_eq!(arena.count(CellState::Occupied(Team::Blue)), 5);
        assert_eq!(arena.get(GridPos::new(2, 4)), CellState::Obstacle);
    }

    #[test]
    fn test_generated_deployment_avoids_obstacles() {
        let scenario = Scenario::skirmish_small();
        for seed in 0..10 {
            let arena = scenario.build_arena(seed).unwrap();
            assert_eq!(arena.count(CellState::Obstacle), 2);
            assert_eq!(arena.count(CellState::Occupied(Team::Red)), 4);
            assert_eq!(arena.count(CellState::Occupied(Team::Blue)), 4);
        }
    }

    #[test]
    fn test_parse_from_ron() {
        let ron = r#"
            Scenario(
                name: "Test",
                rows: 3,
                cols: 4,
                obstacles: [(1, 1)],
                deployments: Fixed([
                    Placement(team: Red, position: (0, 0)),
                    Placement(team: Blue, position: (2, 3)),
                ]),
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.name, "Test");
        assert_eq!(scenario.max_rounds, 200);
        assert_eq!(scenario.profile, SoldierProfile::BASIC);

        let arena = scenario.build_arena(0).unwrap();
        assert_eq!(arena.get(GridPos::new(2, 3)), CellState::Occupied(Team::Blue));
    }

    #[test]
    fn test_parse_generated() {
        let ron = r#"
            Scenario(
                name: "Gen",
                rows: 6,
                cols: 6,
                deployments: Generated(per_team: 2, pattern: Scattered),
                max_rounds: 30,
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(
            scenario.deployments,
            Deployment::Generated {
                per_team: 2,
                pattern: DeployPattern::Scattered
            }
        );
        assert_eq!(scenario.max_rounds, 30);
    }

    #[test]
    fn test_embedded_profile_is_validated() {
        let ron = r#"
            Scenario(
                name: "dead_on_arrival",
                rows: 1,
                cols: 2,
                deployments: Fixed([
                    Placement(team: Red, position: (0, 0)),
                    Placement(team: Blue, position: (0, 1)),
                ]),
                profile: (initial_health: 0),
            )
        "#;
        assert!(matches!(
            Scenario::from_ron_str(ron),
            Err(ScenarioError::Profile(GameError::DataParseError { ref path, .. }))
                if path == "dead_on_arrival"
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dead.ron");
        std::fs::write(&path, ron).unwrap();
        assert!(matches!(
            Scenario::load(&path),
            Err(ScenarioError::Profile(_))
        ));
    }

    #[test]
    fn test_partial_embedded_profile_keeps_basic_stats() {
        let ron = r#"
            Scenario(
                name: "tough",
                rows: 2,
                cols: 2,
                deployments: Generated(per_team: 1, pattern: Flanks),
                profile: (initial_health: 20),
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(
            scenario.profile,
            SoldierProfile {
                initial_health: 20,
                ..SoldierProfile::BASIC
            }
        );
    }

    #[test]
    fn test_overlapping_placement_is_invalid() {
        let mut scenario = Scenario::line_battle();
        scenario.obstacles.push((0, 0));
        assert!(matches!(
            scenario.build_arena(0),
            Err(ScenarioError::Invalid { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Scenario::resolve("no/such/scenario.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duel.ron");
        std::fs::write(
            &path,
            r#"Scenario(
                name: "duel",
                rows: 1,
                cols: 2,
                deployments: Fixed([
                    Placement(team: Red, position: (0, 0)),
                    Placement(team: Blue, position: (0, 1)),
                ]),
            )"#,
        )
        .unwrap();

        let scenario = Scenario::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(scenario.name, "duel");
    }

    #[test]
    fn test_load_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veteran.ron");
        std::fs::write(&path, "SoldierProfile(initial_health: 15, armor: 30, strength: 30, skill: 40)")
            .unwrap();

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.initial_health, 15);

        assert!(matches!(
            load_profile(dir.path().join("missing.ron")),
            Err(ScenarioError::Profile(GameError::DataRead { .. }))
        ));
    }
}
