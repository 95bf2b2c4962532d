//! Game metrics collection for balance analysis.
//!
//! Per-team tallies of what soldiers did each turn, plus summaries across a
//! batch of games.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use skirmish_core::policy::TurnAction;
use skirmish_core::simulation::{Outcome, RoundReport, SoldierId};
use skirmish_core::team::Team;

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Seed used for deployment.
    pub seed: u64,
    /// Rounds played.
    pub rounds: u64,
    /// Winning team (None = stalemate or timeout).
    pub winner: Option<String>,
    /// How the game ended.
    pub outcome: String,
    /// Per-team metrics.
    pub teams: HashMap<String, TeamMetrics>,
    /// Timed events log.
    pub events: Vec<TimedEvent>,
    /// Final battle state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Get or create team metrics.
    pub fn team_mut(&mut self, team: Team) -> &mut TeamMetrics {
        self.teams
            .entry(team.display_name().to_string())
            .or_insert_with(|| TeamMetrics::new(team))
    }

    /// Metrics for `team`, if it ever fielded a soldier.
    #[must_use]
    pub fn team(&self, team: Team) -> Option<&TeamMetrics> {
        self.teams.get(team.display_name())
    }

    /// Record a timed event.
    pub fn record_event(&mut self, round: u64, event_type: EventType, team: Team, details: &str) {
        self.events.push(TimedEvent {
            round,
            event_type,
            team: team.display_name().to_string(),
            details: details.to_string(),
        });
    }

    /// Finalize the game with outcome.
    pub fn finalize(&mut self, rounds: u64, outcome: Outcome) {
        self.rounds = rounds;
        let (winner, label) = match outcome {
            Outcome::Victory(team) => (Some(team.display_name().to_string()), "victory"),
            Outcome::Stalemate => (None, "stalemate"),
            Outcome::Timeout => (None, "timeout"),
        };
        self.winner = winner;
        self.outcome = label.to_string();
    }
}

/// Metrics for a single team in a game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMetrics {
    /// Team name.
    pub team: String,
    /// Soldiers at the start.
    pub starting_strength: u32,
    /// Soldiers still standing at the end.
    pub survivors: u32,

    // === Turns ===
    /// Turns spent attacking.
    pub attacks: u32,
    /// Turns spent moving.
    pub moves: u32,
    /// Turns spent idle.
    pub idles: u32,

    // === Combat ===
    /// Strikes that hit an enemy.
    pub strikes_landed: u32,
    /// Total damage dealt.
    pub damage_dealt: u64,
    /// Total damage taken.
    pub damage_taken: u64,
    /// Enemies felled.
    pub kills: u32,
    /// Soldiers lost.
    pub losses: u32,
    /// Kill/loss ratio.
    pub kd_ratio: f64,

    // === Timing ===
    /// Round of the first attack.
    pub first_attack_round: Option<u64>,
}

impl TeamMetrics {
    /// Create new team metrics.
    #[must_use]
    pub fn new(team: Team) -> Self {
        Self {
            team: team.display_name().to_string(),
            ..Default::default()
        }
    }

    /// Record one turn's action.
    pub fn record_action(&mut self, action: &TurnAction) {
        match action {
            TurnAction::Attack { .. } => self.attacks += 1,
            TurnAction::Move { .. } => self.moves += 1,
            TurnAction::Idle => self.idles += 1,
        }
    }

    /// Calculate final stats.
    ///
    /// Losses count as at least one, so a flawless team's ratio is its kills.
    pub fn calculate_derived_stats(&mut self) {
        self.kd_ratio = f64::from(self.kills) / f64::from(self.losses.max(1));
    }
}

/// A timed event during the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Round when the event occurred.
    pub round: u64,
    /// Type of event.
    pub event_type: EventType,
    /// Team involved.
    pub team: String,
    /// Event details.
    pub details: String,
}

/// Types of events that can be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// First attack by a team.
    FirstAttack,
    /// A soldier fell.
    SoldierFell,
}

/// Summary statistics across multiple games.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games won by each team.
    pub wins_by_team: HashMap<String, u32>,
    /// Win rates by team.
    pub win_rates: HashMap<String, f64>,
    /// Games that ended with nobody able to act.
    pub stalemates: u32,
    /// Games cut off by the round cap.
    pub timeouts: u32,
    /// Average game length in rounds.
    pub avg_rounds: f64,
    /// Shortest game.
    pub min_rounds: u64,
    /// Longest game.
    pub max_rounds: u64,

    // === Aggregated Stats ===
    /// Average survivors per game by team.
    pub avg_survivors: HashMap<String, f64>,
    /// Average K/D ratio by team.
    pub avg_kd_ratio: HashMap<String, f64>,
    /// Average first attack round by team.
    pub avg_first_attack_round: HashMap<String, f64>,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_games: games.len() as u32,
            ..Default::default()
        };

        let mut rounds_sum = 0u64;
        let mut min_rounds = u64::MAX;
        let mut max_rounds = 0u64;

        let mut team_survivors: HashMap<String, Vec<u32>> = HashMap::new();
        let mut team_kd: HashMap<String, Vec<f64>> = HashMap::new();
        let mut team_first_attack: HashMap<String, Vec<u64>> = HashMap::new();

        for game in games {
            rounds_sum += game.rounds;
            min_rounds = min_rounds.min(game.rounds);
            max_rounds = max_rounds.max(game.rounds);

            if let Some(winner) = &game.winner {
                *summary.wins_by_team.entry(winner.clone()).or_default() += 1;
            } else if game.outcome == "timeout" {
                summary.timeouts += 1;
            } else {
                summary.stalemates += 1;
            }

            for (team, metrics) in &game.teams {
                team_survivors
                    .entry(team.clone())
                    .or_default()
                    .push(metrics.survivors);
                team_kd.entry(team.clone()).or_default().push(metrics.kd_ratio);
                if let Some(round) = metrics.first_attack_round {
                    team_first_attack.entry(team.clone()).or_default().push(round);
                }
            }
        }

        summary.avg_rounds = rounds_sum as f64 / games.len() as f64;
        summary.min_rounds = min_rounds;
        summary.max_rounds = max_rounds;

        for (team, wins) in &summary.wins_by_team {
            summary
                .win_rates
                .insert(team.clone(), f64::from(*wins) / f64::from(summary.total_games));
        }

        for (team, values) in team_survivors {
            let avg = f64::from(values.iter().sum::<u32>()) / values.len() as f64;
            summary.avg_survivors.insert(team, avg);
        }

        for (team, values) in team_kd {
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            summary.avg_kd_ratio.insert(team, avg);
        }

        for (team, values) in team_first_attack {
            let avg = values.iter().sum::<u64>() as f64 / values.len() as f64;
            summary.avg_first_attack_round.insert(team, avg);
        }

        summary
    }

    /// Check if team balance is within acceptable range.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        self.win_rates
            .values()
            .all(|rate| (rate - 0.5).abs() <= threshold)
    }

    /// Get the dominant team (if any).
    #[must_use]
    pub fn dominant_team(&self, threshold: f64) -> Option<&String> {
        self.win_rates
            .iter()
            .find(|&(_, &rate)| rate > 0.5 + threshold)
            .map(|(team, _)| team)
    }
}

/// Metrics collector fed with round reports during a game.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: GameMetrics,
    rosters: HashMap<SoldierId, Team>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new(game_id: &str, scenario: &str, seed: u64) -> Self {
        Self {
            metrics: GameMetrics::new(game_id, scenario, seed),
            rosters: HashMap::new(),
        }
    }

    /// Record a soldier present at the start.
    pub fn on_enlisted(&mut self, id: SoldierId, team: Team) {
        self.rosters.insert(id, team);
        self.metrics.team_mut(team).starting_strength += 1;
    }

    /// Record everything in one round's report.
    pub fn on_round(&mut self, report: &RoundReport) {
        for turn in &report.turns {
            let team_metrics = self.metrics.team_mut(turn.team);
            team_metrics.record_action(&turn.action);

            if matches!(turn.action, TurnAction::Attack { .. })
                && team_metrics.first_attack_round.is_none()
            {
                team_metrics.first_attack_round = Some(report.round);
                self.metrics.record_event(
                    report.round,
                    EventType::FirstAttack,
                    turn.team,
                    "First attack",
                );
            }
        }

        for strike in &report.strikes {
            let (Some(&attacker), Some(&defender)) = (
                self.rosters.get(&strike.attacker),
                self.rosters.get(&strike.defender),
            ) else {
                tracing::warn!(?strike, "Strike involves an unknown soldier");
                continue;
            };
            let dealt = self.metrics.team_mut(attacker);
            dealt.strikes_landed += 1;
            dealt.damage_dealt += u64::from(strike.damage);
            self.metrics.team_mut(defender).damage_taken += u64::from(strike.damage);
        }

        for casualty in &report.casualties {
            self.metrics.team_mut(casualty.team).losses += 1;
            if let Some(&killer) = self.rosters.get(&casualty.killed_by) {
                self.metrics.team_mut(killer).kills += 1;
            }
            self.metrics.record_event(
                report.round,
                EventType::SoldierFell,
                casualty.team,
                &format!("soldier {} at {}", casualty.soldier, casualty.position),
            );
        }
    }

    /// Finalize and return the metrics.
    #[must_use]
    pub fn finalize(mut self, rounds: u64, outcome: Outcome, state_hash: u64) -> GameMetrics {
        self.metrics.finalize(rounds, outcome);
        self.metrics.final_state_hash = state_hash;

        for team in self.metrics.teams.values_mut() {
            team.survivors = team.starting_strength.saturating_sub(team.losses);
            team.calculate_derived_stats();
        }

        self.metrics
    }

    /// Get current metrics (immutable).
    #[must_use]
    pub fn current(&self) -> &GameMetrics {
        &self.metrics
    }
}
