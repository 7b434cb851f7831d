//! Match engine — the round controller.
//!
//! Owns the hecs ECS world, the navigation and visibility services, the
//! phase state machine, and all match bookkeeping. Advances one
//! authoritative simulation step per `tick()` and emits a snapshot.
//! Completely headless; the app crate owns real-time pacing.

use std::collections::{HashMap, HashSet, VecDeque};

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use breach_core::commands::MatchCommand;
use breach_core::components::Loadout;
use breach_core::constants::*;
use breach_core::enums::{MatchPhase, Side, TeamId, WinReason};
use breach_core::events::MatchEvent;
use breach_core::map::{MapDef, MapError};
use breach_core::state::{MatchSnapshot, RoundRecord, RoundResult};
use breach_core::types::{AgentId, Position, SimTime};

use breach_nav::{NavigationGraph, VisibilityIndex};

use crate::comms::SpottedBus;
use crate::providers::{
    default_rosters, AgentSpec, DefaultLoadouts, DefaultTactics, LoadoutProvider, TacticsProvider,
};
use crate::round::{RoundState, TeamState};
use crate::systems;
use crate::systems::noise::NoiseField;
use crate::world_setup;

/// Phase durations in ticks.
const FREEZE_TICKS: u64 = (FREEZE_TIME_SECS * TICK_RATE as f64) as u64;
const ROUND_TICKS: u64 = (ROUND_TIME_SECS * TICK_RATE as f64) as u64;
const ROUND_END_TICKS: u64 = (ROUND_END_SECS * TICK_RATE as f64) as u64;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed + same inputs = same match.
    pub seed: u64,
    /// Initial real-time speed multiplier (consumed by the runner).
    pub time_scale: f64,
    /// Hold each round in TacticsPause until ApplyStrategies arrives.
    pub pause_for_strategies: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            pause_for_strategies: false,
        }
    }
}

/// The match engine. Owns the ECS world and all simulation state.
pub struct MatchEngine {
    world: World,
    map: MapDef,
    nav: NavigationGraph,
    vis: VisibilityIndex,
    time: SimTime,
    phase: MatchPhase,
    phase_ticks_remaining: u64,
    round: RoundState,
    teams: [TeamState; 2],
    rosters: Vec<AgentSpec>,
    rng: ChaCha8Rng,
    command_queue: VecDeque<MatchCommand>,
    tick_events: Vec<MatchEvent>,
    event_log: Vec<MatchEvent>,
    tactics: Box<dyn TacticsProvider>,
    loadouts: Box<dyn LoadoutProvider>,
    strategy_goals: HashMap<AgentId, Position>,
    loadout_overrides: HashMap<AgentId, Loadout>,
    noise: NoiseField,
    spotted: SpottedBus,
    prev_visible: HashSet<(Entity, Entity)>,
    paused: bool,
    time_scale: f64,
    pause_for_strategies: bool,
    strategies_applied: bool,
}

impl MatchEngine {
    /// Create an engine for a map. Graph construction failures are fatal
    /// before any tick runs.
    pub fn new(map: MapDef, config: SimConfig) -> Result<Self, MapError> {
        let nav = NavigationGraph::build(&map)?;
        let mut vis = VisibilityIndex::new(&nav);

        // Objective sites are the hot distance-map targets.
        for (_, zone) in map.bomb_sites() {
            if let Some(node) = nav.nearest_node(&zone.center) {
                vis.ensure_distance_field(&nav, node);
            }
        }

        let noise = NoiseField::new(map.zones.len());
        Ok(Self {
            world: World::new(),
            nav,
            vis,
            time: SimTime::default(),
            phase: MatchPhase::default(),
            phase_ticks_remaining: 0,
            round: RoundState::new(),
            teams: [
                TeamState::new(TeamId::Alpha, Side::Attack),
                TeamState::new(TeamId::Bravo, Side::Defense),
            ],
            rosters: default_rosters(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            tick_events: Vec::new(),
            event_log: Vec::new(),
            tactics: Box::new(DefaultTactics),
            loadouts: Box::new(DefaultLoadouts),
            strategy_goals: HashMap::new(),
            loadout_overrides: HashMap::new(),
            noise,
            spotted: SpottedBus::default(),
            prev_visible: HashSet::new(),
            paused: false,
            time_scale: config.time_scale,
            pause_for_strategies: config.pause_for_strategies,
            strategies_applied: false,
            map,
        })
    }

    /// Replace the collaborator providers. Call before StartMatch.
    pub fn with_providers(
        mut self,
        tactics: Box<dyn TacticsProvider>,
        loadouts: Box<dyn LoadoutProvider>,
    ) -> Self {
        self.tactics = tactics;
        self.loadouts = loadouts;
        self
    }

    /// Replace the roster. Call before StartMatch.
    pub fn set_rosters(&mut self, rosters: Vec<AgentSpec>) {
        self.rosters = rosters;
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: MatchCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = MatchCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the snapshot.
    pub fn tick(&mut self) -> MatchSnapshot {
        self.process_commands();

        if !self.paused {
            match self.phase {
                MatchPhase::Warmup | MatchPhase::TacticsPause | MatchPhase::MatchEnd => {}
                MatchPhase::FreezeTime => {
                    self.time.advance();
                    if self.tick_phase_clock() {
                        if self.pause_for_strategies && !self.strategies_applied {
                            self.set_phase(MatchPhase::TacticsPause, 0);
                        } else {
                            self.begin_live();
                        }
                    }
                }
                MatchPhase::Live => {
                    self.time.advance();
                    self.live_tick();
                }
                MatchPhase::RoundEnd => {
                    self.time.advance();
                    if self.tick_phase_clock() {
                        self.advance_round();
                    }
                }
            }
        }

        // Cooperative background precompute: one bounded batch per tick,
        // regardless of phase. Queries fall back until it completes.
        self.vis.step(&self.nav, VISIBILITY_BATCH_PAIRS);

        let events = std::mem::take(&mut self.tick_events);
        self.event_log.extend(events.iter().cloned());
        systems::snapshot::build_snapshot(
            &self.world,
            &self.map,
            &self.time,
            self.phase,
            self.phase_ticks_remaining,
            &self.round,
            &self.teams,
            &self.noise,
            events,
        )
    }

    // --- Accessors ---

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn teams(&self) -> &[TeamState; 2] {
        &self.teams
    }

    /// The append-only event log since match start (or last reset).
    pub fn event_log(&self) -> &[MatchEvent] {
        &self.event_log
    }

    /// Economy outcome of the most recently completed round.
    pub fn last_round_result(&self) -> Option<RoundResult> {
        self.round.last_result
    }

    /// Whether the background visibility precompute has finished.
    pub fn visibility_ready(&self) -> bool {
        self.vis.ready()
    }

    // --- Command handling ---

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: MatchCommand) {
        match command {
            MatchCommand::StartMatch => {
                if self.phase == MatchPhase::Warmup {
                    log::info!("match starting on '{}'", self.map.name);
                    self.start_round();
                }
            }
            MatchCommand::Pause => {
                self.paused = true;
            }
            MatchCommand::Resume => {
                self.paused = false;
            }
            MatchCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 8.0);
            }
            MatchCommand::ForceNextRound => {
                if self.phase == MatchPhase::RoundEnd {
                    self.advance_round();
                }
            }
            MatchCommand::ResetMatch => {
                self.reset_match();
            }
            MatchCommand::ApplyStrategies { strategies } => {
                for strategy in strategies {
                    for (id, goal) in strategy.goals {
                        if self.roster_team(id) == Some(strategy.team) {
                            self.strategy_goals.insert(id, goal);
                        }
                    }
                    for (id, loadout) in strategy.loadouts {
                        if self.roster_team(id) == Some(strategy.team) {
                            self.loadout_overrides.insert(id, loadout);
                        }
                    }
                }
                self.strategies_applied = true;
                if self.phase == MatchPhase::TacticsPause {
                    self.begin_live();
                }
            }
        }
    }

    fn roster_team(&self, id: AgentId) -> Option<TeamId> {
        self.rosters.iter().find(|s| s.id == id).map(|s| s.team)
    }

    // --- Phase machine ---

    /// Decrement the phase clock; true when it reaches zero.
    fn tick_phase_clock(&mut self) -> bool {
        self.phase_ticks_remaining = self.phase_ticks_remaining.saturating_sub(1);
        self.phase_ticks_remaining == 0
    }

    fn set_phase(&mut self, phase: MatchPhase, ticks: u64) {
        self.phase = phase;
        self.phase_ticks_remaining = ticks;
        self.tick_events.push(MatchEvent::PhaseChanged { phase });
    }

    fn begin_live(&mut self) {
        self.set_phase(MatchPhase::Live, ROUND_TICKS);
    }

    /// One live simulation step: noise, objective, goals, movement,
    /// spotting, combat, then the win check — in that order, on the
    /// positions computed this tick.
    fn live_tick(&mut self) {
        self.noise.decay();

        systems::objective::run(
            &self.world,
            &self.map,
            &mut self.round.bomb,
            &mut self.round.planted_this_round,
            &mut self.tick_events,
        );
        let acting = systems::objective::acting_agent(&self.round.bomb);

        systems::movement::refresh_goals(
            &mut self.world,
            &self.map,
            &self.nav,
            &self.vis,
            self.tactics.as_mut(),
            &self.strategy_goals,
            &self.round.bomb,
            acting,
        );
        systems::movement::run(&mut self.world, acting);

        let pairs = systems::spotting::run(
            &mut self.world,
            &self.nav,
            &self.vis,
            &mut self.prev_visible,
            &mut self.spotted,
            self.time.tick,
        );
        systems::combat::run(
            &mut self.world,
            &self.map,
            &self.nav,
            &self.vis,
            pairs,
            &mut self.round.bomb,
            &mut self.noise,
            &mut self.tick_events,
            &mut self.rng,
            self.time.tick,
        );

        self.phase_ticks_remaining = self.phase_ticks_remaining.saturating_sub(1);

        if self.round.decided.is_none() {
            if let Some((side, reason)) =
                systems::win::evaluate(&self.world, &self.round.bomb, self.phase_ticks_remaining)
            {
                self.finish_round(side, reason);
            }
        }
    }

    /// Score the round exactly once and move to RoundEnd.
    fn finish_round(&mut self, side: Side, reason: WinReason) {
        if self.phase != MatchPhase::Live || self.round.decided.is_some() {
            return;
        }
        self.round.decided = Some((side, reason));

        let winner_idx = if self.teams[0].side == side { 0 } else { 1 };
        let loser_idx = 1 - winner_idx;
        let winner_team = self.teams[winner_idx].team;

        self.teams[winner_idx].score += 1;
        let winner_delta = self.teams[winner_idx].apply_win();
        let mut loser_delta = self.teams[loser_idx].apply_loss();

        // The plant pays out even when the attack loses the round.
        if self.round.planted_this_round && self.teams[loser_idx].side == Side::Attack {
            self.teams[loser_idx].credit(PLANT_BONUS);
            loser_delta += PLANT_BONUS;
        }

        let record = RoundRecord {
            round: self.round.number,
            winner: winner_team,
            winning_side: side,
            reason,
            end_tick: self.time.tick,
        };
        self.round.history.push(record);
        self.round.last_result = Some(RoundResult {
            record,
            winner_delta,
            loser_delta,
        });
        self.tick_events.push(MatchEvent::RoundEnded {
            winner: winner_team,
            side,
            reason,
            end_tick: self.time.tick,
        });
        log::info!(
            "round {} to {:?} ({:?}), score {}:{}",
            self.round.number,
            winner_team,
            reason,
            self.teams[0].score,
            self.teams[1].score
        );

        if self.teams[winner_idx].score >= self.round.win_threshold {
            self.round.match_winner = Some(winner_team);
        }

        self.set_phase(MatchPhase::RoundEnd, ROUND_END_TICKS);
    }

    /// Leave RoundEnd: finish the match, or run the halftime/overtime
    /// bookkeeping and start the next round.
    fn advance_round(&mut self) {
        if let Some(winner) = self.round.match_winner {
            self.tick_events.push(MatchEvent::MatchEnded { winner });
            self.set_phase(MatchPhase::MatchEnd, 0);
            log::info!("match over, winner {winner:?}");
            return;
        }

        self.round.number += 1;
        let number = self.round.number;

        if number == REGULATION_HALF_ROUNDS + 1 {
            self.swap_sides(START_MONEY);
        }
        if number > REGULATION_ROUNDS {
            let ot_round = number - REGULATION_ROUNDS;
            let segment = 2 * OVERTIME_HALF_ROUNDS;
            if ot_round % segment == 1 {
                // Tied at the segment boundary: fresh mini-match.
                self.round.win_threshold += OVERTIME_WIN_INCREMENT;
                for team in &mut self.teams {
                    team.reset_economy(OVERTIME_MONEY);
                }
                self.tick_events.push(MatchEvent::OvertimeStarted {
                    win_threshold: self.round.win_threshold,
                });
                log::info!("overtime: threshold now {}", self.round.win_threshold);
            } else if ot_round % segment == OVERTIME_HALF_ROUNDS + 1 {
                self.swap_sides(OVERTIME_MONEY);
            }
        }

        self.start_round();
    }

    fn swap_sides(&mut self, money: u32) {
        for team in &mut self.teams {
            team.side = team.side.opponent();
            team.reset_economy(money);
        }
        self.tick_events.push(MatchEvent::SidesSwapped);
    }

    /// Respawn the world for the current round number and enter freeze.
    fn start_round(&mut self) {
        let attack_side_team = self
            .teams
            .iter()
            .find(|t| t.side == Side::Attack)
            .map(|t| t.team)
            .unwrap_or(TeamId::Alpha);
        let attacker_ids: Vec<AgentId> = self
            .rosters
            .iter()
            .filter(|s| s.team == attack_side_team)
            .map(|s| s.id)
            .collect();
        let carrier = attacker_ids
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(AgentId(0));

        self.round.begin_round(carrier);
        world_setup::respawn_agents(
            &mut self.world,
            &self.map,
            &self.rosters,
            &self.teams,
            self.loadouts.as_mut(),
            &self.loadout_overrides,
            self.round.number,
        );

        self.spotted.clear();
        for spec in &self.rosters {
            let delay_secs =
                SPOTTED_DELAY_BASE + (1.0 - spec.skills.composure.clamp(0.0, 1.0)) * SPOTTED_DELAY_SPAN;
            let delay_ticks = (delay_secs * TICK_RATE as f64).round() as u64;
            self.spotted.subscribe(spec.id, delay_ticks);
        }
        self.prev_visible.clear();
        self.noise.reset();
        self.strategies_applied = false;

        self.tick_events.push(MatchEvent::RoundStarted {
            round: self.round.number,
        });
        self.set_phase(MatchPhase::FreezeTime, FREEZE_TICKS);
    }

    /// Full reinitialization back to warmup.
    fn reset_match(&mut self) {
        let stale: Vec<Entity> = self.world.iter().map(|e| e.entity()).collect();
        for entity in stale {
            let _ = self.world.despawn(entity);
        }
        self.teams = [
            TeamState::new(TeamId::Alpha, Side::Attack),
            TeamState::new(TeamId::Bravo, Side::Defense),
        ];
        self.round = RoundState::new();
        self.time = SimTime::default();
        self.event_log.clear();
        self.tick_events.clear();
        self.strategy_goals.clear();
        self.loadout_overrides.clear();
        self.noise.reset();
        self.spotted.clear();
        self.prev_visible.clear();
        self.paused = false;
        self.strategies_applied = false;
        self.set_phase(MatchPhase::Warmup, 0);
        log::info!("match reset");
    }

    // --- Test support ---

    /// Teleport an agent (tests drive scenarios with this).
    #[cfg(test)]
    pub fn place_agent(&mut self, id: AgentId, position: Position) {
        if let Some(entity) = world_setup::agent_entity(&self.world, id) {
            if let Ok(mut pos) = self.world.get::<&mut Position>(entity) {
                *pos = position;
            }
        }
    }

    /// Mark an agent dead without a duel.
    #[cfg(test)]
    pub fn kill_agent(&mut self, id: AgentId) {
        if let Some(entity) = world_setup::agent_entity(&self.world, id) {
            if let Ok(mut health) = self.world.get::<&mut breach_core::components::Health>(entity)
            {
                health.hp = 0;
                health.alive = false;
            }
        }
    }

    /// Direct access to the win evaluation, for idempotence tests.
    #[cfg(test)]
    pub fn evaluate_win(&self) -> Option<(Side, WinReason)> {
        systems::win::evaluate(&self.world, &self.round.bomb, self.phase_ticks_remaining)
    }

    /// Override the bomb state (tests drive objective scenarios with this).
    #[cfg(test)]
    pub fn set_bomb(&mut self, bomb: breach_core::enums::BombState) {
        self.round.bomb = bomb;
    }
}
