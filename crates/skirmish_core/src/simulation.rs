//! Turn scheduler.
//!
//! The scheduler owns the soldiers, borrows the arena they stand on, and
//! hands out turns one soldier at a time. It is also the grid's side of the
//! contract: it mirrors moves onto occupancy and resolves strikes.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - Turns go to soldiers in ascending id order
//! - Strikes are resolved right after the turn that issued them
//! - No randomness anywhere
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::data::SoldierProfile;
//! use skirmish_core::simulation::Skirmish;
//! use skirmish_core::spatial::GridPos;
//! use skirmish_core::team::Team;
//!
//! let arena = Arena::new(5, 5).unwrap();
//! let mut battle = Skirmish::new(&arena, SoldierProfile::default());
//! battle.enlist(Team::Red, GridPos::new(2, 2)).unwrap();
//! battle.enlist(Team::Blue, GridPos::new(2, 3)).unwrap();
//!
//! let report = battle.play_round().unwrap();
//! assert_eq!(report.turns.len(), 2);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::battlefield::BattleField;
use crate::combat::strike_damage;
use crate::data::SoldierProfile;
use crate::error::{GameError, Result};
use crate::policy::TurnAction;
use crate::scanner::count_enemies_remaining;
use crate::soldier::Soldier;
use crate::spatial::GridPos;
use crate::team::{CellState, Team};

/// Identifier handed out by [`Skirmish::enlist`], increasing from 1.
pub type SoldierId = u32;

/// One soldier's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Who acted.
    pub soldier: SoldierId,
    /// Their team.
    pub team: Team,
    /// What they did.
    pub action: TurnAction,
}

/// A resolved strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeRecord {
    /// Who struck.
    pub attacker: SoldierId,
    /// Who was hit.
    pub defender: SoldierId,
    /// Health removed.
    pub damage: u32,
    /// Defender's health afterwards.
    pub remaining: u32,
}

/// A soldier removed from the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casualty {
    /// The fallen soldier.
    pub soldier: SoldierId,
    /// Their team.
    pub team: Team,
    /// Where they fell.
    pub position: GridPos,
    /// Who landed the last strike.
    pub killed_by: SoldierId,
}

/// Everything that happened in one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// One-based round number.
    pub round: u64,
    /// Turns in the order they were taken.
    pub turns: Vec<TurnRecord>,
    /// Strikes that hit a soldier.
    pub strikes: Vec<StrikeRecord>,
    /// Soldiers removed this round.
    pub casualties: Vec<Casualty>,
}

impl RoundReport {
    /// True when every turn was idle.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.turns.iter().all(|t| t.action == TurnAction::Idle)
    }
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The other team has no soldiers left on the grid.
    Victory(Team),
    /// Nobody is left, or a whole round passed with every soldier idle.
    Stalemate,
    /// The round cap was reached first.
    Timeout,
}

/// Result of [`Skirmish::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    /// How it ended.
    pub outcome: Outcome,
    /// Rounds actually played.
    pub rounds: u64,
}

/// Serializable picture of a battle between rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Rounds played so far.
    pub round: u64,
    /// Grid height.
    pub rows: i32,
    /// Grid width.
    pub cols: i32,
    /// Cells in row-major order.
    pub cells: Vec<CellState>,
    /// Living soldiers in id order.
    pub soldiers: Vec<SoldierSnapshot>,
    /// Next id to hand out.
    pub next_id: SoldierId,
}

/// One soldier inside a [`BattleSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldierSnapshot {
    /// Identifier.
    pub id: SoldierId,
    /// Team.
    pub team: Team,
    /// Cell.
    pub position: GridPos,
    /// Remaining health.
    pub health: u32,
}

impl BattleSnapshot {
    /// Rebuild the arena this snapshot was taken from.
    pub fn to_arena(&self) -> Result<Arena> {
        let arena = Arena::new(self.rows, self.cols)?;
        if self.cells.len() != (self.rows as usize) * (self.cols as usize) {
            return Err(GameError::InvalidState(format!(
                "snapshot has {} cells for a {}x{} grid",
                self.cells.len(),
                self.rows,
                self.cols
            )));
        }
        for (index, &cell) in self.cells.iter().enumerate() {
            let pos = GridPos::new(index as i32 / self.cols, index as i32 % self.cols);
            match cell {
                CellState::Empty | CellState::OutOfBounds => {}
                CellState::Obstacle => arena.set_obstacle(pos)?,
                CellState::Occupied(team) => arena.place(pos, team)?,
            }
        }
        Ok(arena)
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize snapshot: {e}")))
    }

    /// Decode from bincode.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::Serialization(format!("Failed to deserialize snapshot: {e}")))
    }
}

/// A battle in progress on a borrowed arena.
#[derive(Debug)]
pub struct Skirmish<'a> {
    arena: &'a Arena,
    profile: SoldierProfile,
    round: u64,
    soldiers: BTreeMap<SoldierId, Soldier<'a, Arena>>,
    next_id: SoldierId,
}

impl<'a> Skirmish<'a> {
    /// Start an empty battle on `arena`. Every soldier uses `profile`.
    #[must_use]
    pub fn new(arena: &'a Arena, profile: SoldierProfile) -> Self {
        Self {
            arena,
            profile,
            round: 0,
            soldiers: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Start a battle with a soldier for every occupied cell already on
    /// `arena`, enlisted in row-major order.
    #[must_use]
    pub fn muster(arena: &'a Arena, profile: SoldierProfile) -> Self {
        let mut battle = Self::new(arena, profile);
        for row in 0..arena.rows() {
            for col in 0..arena.cols() {
                let pos = GridPos::new(row, col);
                if let CellState::Occupied(team) = arena.get(pos) {
                    battle.register(team, pos, profile.initial_health);
                }
            }
        }
        battle
    }

    /// Resume a battle from a snapshot. `arena` must be the one rebuilt by
    /// [`BattleSnapshot::to_arena`].
    pub fn resume(
        arena: &'a Arena,
        snapshot: &BattleSnapshot,
        profile: SoldierProfile,
    ) -> Result<Self> {
        let mut battle = Self::new(arena, profile);
        battle.round = snapshot.round;
        for s in &snapshot.soldiers {
            if arena.get(s.position) != CellState::Occupied(s.team) {
                return Err(GameError::NoOccupant(s.position));
            }
            let mut soldier = Soldier::with_profile(arena, s.team, s.position, &profile);
            soldier.receive_damage(profile.initial_health.saturating_sub(s.health));
            battle.soldiers.insert(s.id, soldier);
        }
        battle.next_id = snapshot.next_id;
        Ok(battle)
    }

    fn register(&mut self, team: Team, pos: GridPos, health: u32) -> SoldierId {
        let id = self.next_id;
        self.next_id += 1;
        let mut soldier = Soldier::with_profile(self.arena, team, pos, &self.profile);
        soldier.receive_damage(self.profile.initial_health.saturating_sub(health));
        self.soldiers.insert(id, soldier);
        id
    }

    /// Place a new soldier on an empty cell.
    pub fn enlist(&mut self, team: Team, pos: GridPos) -> Result<SoldierId> {
        self.arena.place(pos, team)?;
        let id = self.register(team, pos, self.profile.initial_health);
        tracing::debug!(id, %team, %pos, "Soldier enlisted");
        Ok(id)
    }

    /// Rounds played so far.
    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// Stat block every soldier shares.
    #[must_use]
    pub const fn profile(&self) -> &SoldierProfile {
        &self.profile
    }

    /// The arena being fought on.
    #[must_use]
    pub const fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Look up a living soldier.
    #[must_use]
    pub fn soldier(&self, id: SoldierId) -> Option<&Soldier<'a, Arena>> {
        self.soldiers.get(&id)
    }

    /// Living soldiers in id order.
    pub fn soldiers(&self) -> impl Iterator<Item = (SoldierId, &Soldier<'a, Arena>)> {
        self.soldiers.iter().map(|(&id, s)| (id, s))
    }

    /// Number of living soldiers on `team`.
    #[must_use]
    pub fn strength(&self, team: Team) -> usize {
        self.soldiers.values().filter(|s| s.team() == team).count()
    }

    fn soldier_at(&self, pos: GridPos) -> Option<SoldierId> {
        self.soldiers
            .iter()
            .find(|(_, s)| s.position() == pos)
            .map(|(&id, _)| id)
    }

    /// Give every living soldier one turn, lowest id first.
    ///
    /// Moves and strikes are applied before the next soldier acts, so later
    /// turns see the results of earlier ones.
    pub fn play_round(&mut self) -> Result<RoundReport> {
        let mut report = RoundReport {
            round: self.round + 1,
            ..RoundReport::default()
        };

        let ids: Vec<SoldierId> = self.soldiers.keys().copied().collect();
        for id in ids {
            // Fell earlier this round.
            let Some(soldier) = self.soldiers.get_mut(&id) else {
                continue;
            };
            let team = soldier.team();
            let action = soldier.perform_turn();

            if let TurnAction::Move { from, to, .. } = action {
                self.arena.relocate(from, to)?;
            }
            report.turns.push(TurnRecord {
                soldier: id,
                team,
                action,
            });

            self.resolve_strikes(id, &mut report)?;

            #[cfg(feature = "debug-validation")]
            self.validate()?;
        }

        self.round += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(round = self.round, state_hash = hash, "Skirmish state hash");
        }

        Ok(report)
    }

    fn resolve_strikes(&mut self, attacker: SoldierId, report: &mut RoundReport) -> Result<()> {
        for target in self.arena.take_strikes() {
            let Some(defender) = self.soldier_at(target) else {
                tracing::debug!(attacker, %target, "Strike hit nothing");
                continue;
            };

            let damage = strike_damage(&self.profile, &self.profile);
            let soldier = self
                .soldiers
                .get_mut(&defender)
                .ok_or(GameError::SoldierNotFound(defender))?;
            soldier.receive_damage(damage);
            let remaining = soldier.health();
            let team = soldier.team();

            report.strikes.push(StrikeRecord {
                attacker,
                defender,
                damage,
                remaining,
            });

            if remaining == 0 {
                self.soldiers.remove(&defender);
                self.arena.clear(target)?;
                tracing::debug!(soldier = defender, %team, pos = %target, killed_by = attacker, "Soldier fell");
                report.casualties.push(Casualty {
                    soldier: defender,
                    team,
                    position: target,
                    killed_by: attacker,
                });
            }
        }
        Ok(())
    }

    /// Check that every soldier's cell shows its team.
    pub fn validate(&self) -> Result<()> {
        for (id, soldier) in &self.soldiers {
            if self.arena.get(soldier.position()) != CellState::Occupied(soldier.team()) {
                return Err(GameError::InvalidState(format!(
                    "soldier {id} at {} is not on the grid",
                    soldier.position()
                )));
            }
        }
        Ok(())
    }

    /// Whether the battle is over, judged from the grid.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        let red_left = count_enemies_remaining(self.arena, Team::Blue);
        let blue_left = count_enemies_remaining(self.arena, Team::Red);
        match (red_left, blue_left) {
            (0, 0) => Some(Outcome::Stalemate),
            (_, 0) => Some(Outcome::Victory(Team::Red)),
            (0, _) => Some(Outcome::Victory(Team::Blue)),
            _ => None,
        }
    }

    /// Play rounds until the battle is decided or `max_rounds` have passed.
    pub fn run(&mut self, max_rounds: u64) -> Result<BattleResult> {
        self.run_with(max_rounds, |_| {})
    }

    /// [`Skirmish::run`], handing every round's report to `observe`.
    pub fn run_with<O>(&mut self, max_rounds: u64, mut observe: O) -> Result<BattleResult>
    where
        O: FnMut(&RoundReport),
    {
        let start = self.round;
        let outcome = loop {
            if let Some(outcome) = self.outcome() {
                break outcome;
            }
            if self.round - start >= max_rounds {
                break Outcome::Timeout;
            }
            let report = self.play_round()?;
            observe(&report);
            if report.is_quiet() {
                break self.outcome().unwrap_or(Outcome::Stalemate);
            }
        };

        tracing::debug!(?outcome, rounds = self.round - start, "Battle finished");
        Ok(BattleResult {
            outcome,
            rounds: self.round - start,
        })
    }

    /// Hash of the full battle state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.round.hash(&mut hasher);
        self.soldiers.len().hash(&mut hasher);
        for (id, soldier) in &self.soldiers {
            id.hash(&mut hasher);
            soldier.team().hash(&mut hasher);
            soldier.position().hash(&mut hasher);
            soldier.health().hash(&mut hasher);
        }
        self.arena.cells().hash(&mut hasher);

        hasher.finish()
    }

    /// Capture the battle between rounds.
    #[must_use]
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            round: self.round,
            rows: self.arena.rows(),
            cols: self.arena.cols(),
            cells: self.arena.cells(),
            soldiers: self
                .soldiers
                .iter()
                .map(|(&id, s)| SoldierSnapshot {
                    id,
                    team: s.team(),
                    position: s.position(),
                    health: s.health(),
                })
                .collect(),
            next_id: self.next_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: i32, col: i32) -> GridPos {
        GridPos::new(row, col)
    }

    #[test]
    fn test_enlist_assigns_increasing_ids() {
        let arena = Arena::new(3, 3).unwrap();
        let mut battle = Skirmish::new(&arena, SoldierProfile::default());
        assert_eq!(battle.enlist(Team::Red, pos(0, 0)).unwrap(), 1);
        assert_eq!(battle.enlist(Team::Blue, pos(2, 2)).unwrap(), 2);
        assert!(battle.enlist(Team::Blue, pos(2, 2)).is_err());
        assert_eq!(arena.get(pos(2, 2)), CellState::Occupied(Team::Blue));
    }

    #[test]
    fn test_adjacent_pair_trades_strikes() {
        let arena = Arena::new(5, 5).unwrap();
        let mut battle = Skirmish::new(&arena, SoldierProfile::default());
        let red = battle.enlist(Team::Red, pos(2, 2)).unwrap();
        let blue = battle.enlist(Team::Blue, pos(2, 3)).unwrap();

        let report = battle.play_round().unwrap();
        assert_eq!(
            report.turns[0].action,
            TurnAction::Attack {
                target: pos(2, 3),
                direction: crate::spatial::Direction::Right,
            }
        );
        assert_eq!(report.strikes.len(), 2);
        assert_eq!(report.strikes[0].attacker, red);
        assert_eq!(report.strikes[0].defender, blue);
        assert_eq!(battle.soldier(red).unwrap().position(), pos(2, 2));
    }

    #[test]
    fn test_first_mover_wins_duel() {
        let arena = Arena::new(5, 5).unwrap();
        let mut battle = Skirmish::new(&arena, SoldierProfile::default());
        battle.enlist(Team::Red, pos(2, 2)).unwrap();
        battle.enlist(Team::Blue, pos(2, 3)).unwrap();

        // 4 damage per strike against 10 health: red lands the third strike first.
        let result = battle.run(10).unwrap();
        assert_eq!(result.outcome, Outcome::Victory(Team::Red));
        assert_eq!(result.rounds, 3);
        assert_eq!(arena.get(pos(2, 3)), CellState::Empty);
        assert_eq!(battle.strength(Team::Blue), 0);
    }

    #[test]
    fn test_moves_are_mirrored_on_grid() {
        let arena = Arena::new(3, 3).unwrap();
        let mut battle = Skirmish::new(&arena, SoldierProfile::default());
        let id = battle.enlist(Team::Red, pos(1, 1)).unwrap();
        battle.enlist(Team::Blue, pos(0, 2)).unwrap();

        battle.play_round().unwrap();
        assert_eq!(battle.soldier(id).unwrap().position(), pos(1, 0));
        assert_eq!(arena.get(pos(1, 1)), CellState::Empty);
        assert_eq!(arena.get(pos(1, 0)), CellState::Occupied(Team::Red));
        battle.validate().unwrap();
    }

    #[test]
    fn test_quiet_round_ends_in_stalemate() {
        let arena = Arena::from_ascii(
            "R#.
             ###
             .#B",
        )
        .unwrap();
        let mut battle = Skirmish::muster(&arena, SoldierProfile::default());
        let result = battle.run(100).unwrap();
        assert_eq!(result.outcome, Outcome::Stalemate);
        assert_eq!(result.rounds, 1);
    }

    #[test]
    fn test_timeout() {
        let arena = Arena::from_ascii(
            "R...
             ....
             ...B",
        )
        .unwrap();
        let mut battle = Skirmish::muster(&arena, SoldierProfile::default());
        let result = battle.run(0).unwrap();
        assert_eq!(result.outcome, Outcome::Timeout);
        assert_eq!(result.rounds, 0);
    }

    #[test]
    fn test_run_with_sees_every_round() {
        let arena = Arena::new(5, 5).unwrap();
        let mut battle = Skirmish::new(&arena, SoldierProfile::default());
        battle.enlist(Team::Red, pos(2, 2)).unwrap();
        battle.enlist(Team::Blue, pos(2, 3)).unwrap();

        let mut seen = Vec::new();
        let result = battle.run_with(10, |report| seen.push(report.round)).unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(result.rounds, 3);
    }

    #[test]
    fn test_outcome_from_grid() {
        let arena = Arena::from_ascii("R.R").unwrap();
        let battle = Skirmish::muster(&arena, SoldierProfile::default());
        assert_eq!(battle.outcome(), Some(Outcome::Victory(Team::Red)));

        let empty = Arena::new(2, 2).unwrap();
        let battle = Skirmish::new(&empty, SoldierProfile::default());
        assert_eq!(battle.outcome(), Some(Outcome::Stalemate));
    }

    #[test]
    fn test_muster_enlists_in_row_major_order() {
        let arena = Arena::from_ascii(
            ".B
             R.",
        )
        .unwrap();
        let battle = Skirmish::muster(&arena, SoldierProfile::default());
        assert_eq!(battle.soldier(1).unwrap().team(), Team::Blue);
        assert_eq!(battle.soldier(2).unwrap().team(), Team::Red);
    }

    #[test]
    fn test_deterministic_hash() {
        let build = |arena: &Arena| {
            let mut battle = Skirmish::muster(arena, SoldierProfile::default());
            for _ in 0..5 {
                battle.play_round().unwrap();
            }
            battle.state_hash()
        };
        let map = "R...B\n.R.B.\n..#..\n";
        let a = Arena::from_ascii(map).unwrap();
        let b = Arena::from_ascii(map).unwrap();
        assert_eq!(build(&a), build(&b));
    }

    #[test]
    fn test_snapshot_roundtrip_resumes_identically() {
        let map = "R..B.\n.R..B\n.....\n";
        let arena = Arena::from_ascii(map).unwrap();
        let mut battle = Skirmish::muster(&arena, SoldierProfile::default());
        battle.play_round().unwrap();

        let bytes = battle.snapshot().to_bytes().unwrap();
        let snapshot = BattleSnapshot::from_bytes(&bytes).unwrap();
        let restored_arena = snapshot.to_arena().unwrap();
        let mut restored =
            Skirmish::resume(&restored_arena, &snapshot, SoldierProfile::default()).unwrap();
        assert_eq!(restored.state_hash(), battle.state_hash());

        battle.play_round().unwrap();
        restored.play_round().unwrap();
        assert_eq!(restored.state_hash(), battle.state_hash());
    }

    #[test]
    fn test_bad_snapshot_bytes() {
        assert!(matches!(
            BattleSnapshot::from_bytes(&[1, 2, 3]),
            Err(GameError::Serialization(_))
        ));
    }
}
