//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 10;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Navigation ---

/// Spatial grid cell size for nearest-node bucketing (map units).
pub const NAV_CELL_SIZE: f64 = 50.0;

/// A point is walkable if its nearest node is within this distance.
pub const SNAP_THRESHOLD: f64 = 40.0;

/// Sample spacing along a line-of-sight ray (map units).
/// Matches the collision resolution of the source maps (5 units per cell).
pub const LOS_SAMPLE_SPACING: f64 = 5.0;

/// Maximum distance at which two nodes are checked for mutual visibility.
pub const MAX_VISION_DISTANCE: f64 = 2_200.0;

/// Node pairs processed per visibility precompute batch.
pub const VISIBILITY_BATCH_PAIRS: usize = 256;

/// A node is a chokepoint when its degree is below this fraction of the
/// mean degree of its neighbors.
pub const CHOKEPOINT_DEGREE_RATIO: f64 = 0.6;

// --- Movement ---

/// Agent movement speed (map units per second).
pub const MOVE_SPEED: f64 = 250.0;

/// An agent has reached a waypoint when within this distance of it.
pub const WAYPOINT_REACH_RADIUS: f64 = 8.0;

// --- Round clock ---

/// Freeze time before each round goes live (seconds).
pub const FREEZE_TIME_SECS: f64 = 15.0;

/// Live round duration (seconds).
pub const ROUND_TIME_SECS: f64 = 115.0;

/// Post-round pause before the next freeze time (seconds).
pub const ROUND_END_SECS: f64 = 7.0;

// --- Objective ---

/// Time to plant the bomb (seconds).
pub const PLANT_TIME_SECS: f64 = 3.2;

/// Time to defuse without a kit (seconds).
pub const DEFUSE_TIME_SECS: f64 = 10.0;

/// Time to defuse with a kit (seconds).
pub const KIT_DEFUSE_TIME_SECS: f64 = 5.0;

/// Plant-to-detonation countdown (seconds).
pub const BOMB_TIMER_SECS: f64 = 40.0;

/// Ticks past the nominal detonation time before detonation is forced.
/// Guards against the bomb clock and round clock drifting apart.
pub const DETONATION_SAFETY_TICKS: u64 = 10;

/// A dropped bomb can be picked up within this radius.
pub const BOMB_PICKUP_RADIUS: f64 = 30.0;

// --- Match format ---

/// Rounds needed to win in regulation.
pub const REGULATION_WIN_THRESHOLD: u8 = 13;

/// Rounds in a regulation half; sides swap after this many rounds.
pub const REGULATION_HALF_ROUNDS: u8 = 12;

/// Total regulation rounds.
pub const REGULATION_ROUNDS: u8 = 24;

/// Win-threshold increase per overtime segment.
pub const OVERTIME_WIN_INCREMENT: u8 = 3;

/// Rounds in an overtime half; sides swap after this many overtime rounds.
pub const OVERTIME_HALF_ROUNDS: u8 = 3;

// --- Economy ---

/// Team money at the start of regulation and after halftime.
pub const START_MONEY: u32 = 4_000;

/// Team money at the start of each overtime segment.
pub const OVERTIME_MONEY: u32 = 50_000;

/// Team money ceiling.
pub const TEAM_MONEY_CAP: u32 = 80_000;

/// Round-win reward per agent, aggregated per team.
pub const WIN_REWARD: u32 = 16_250;

/// Consolation income per agent by consecutive-loss level, aggregated per team.
pub const LOSS_BONUS_TABLE: [u32; 5] = [7_000, 9_500, 12_000, 14_500, 17_000];

/// Highest loss-bonus level.
pub const LOSS_BONUS_MAX_LEVEL: u8 = 4;

/// Bonus to the attacking team for a successful plant (paid even on loss).
pub const PLANT_BONUS: u32 = 4_000;

// --- Combat: probabilities ---

/// Hit probability is never clamped below this.
pub const HIT_PROB_FLOOR: f64 = 0.05;

/// Hit probability is never clamped above this.
pub const HIT_PROB_CEILING: f64 = 0.95;

/// Aim-score weights: crosshair placement, first-bullet precision,
/// positioning, composure.
pub const AIM_WEIGHT_CROSSHAIR: f64 = 0.35;
pub const AIM_WEIGHT_FIRST_BULLET: f64 = 0.25;
pub const AIM_WEIGHT_POSITIONING: f64 = 0.20;
pub const AIM_WEIGHT_COMPOSURE: f64 = 0.20;

/// Distance at which the range penalty saturates (map units).
pub const MAX_COMBAT_RANGE: f64 = 1_500.0;

/// Range penalty at saturation.
pub const RANGE_PENALTY_MAX: f64 = 0.30;

/// Penalty for a fully covered target.
pub const COVER_PENALTY_MAX: f64 = 0.35;

/// Penalty when the target is moving.
pub const TARGET_MOVING_PENALTY: f64 = 0.15;

/// Penalty when the shooter is moving.
pub const SHOOTER_MOVING_PENALTY: f64 = 0.20;

/// Penalty per unit of shooter flash fraction.
pub const FLASH_HIT_PENALTY: f64 = 0.50;

/// Penalty for engaging across zone boundaries.
pub const CROSS_ZONE_PENALTY: f64 = 0.08;

/// Bonus to the favored side of a peek (the pre-aimed holder, or the
/// initiating peeker when nobody holds), and the penalty to the other.
pub const HOLD_ADVANTAGE: f64 = 0.10;
pub const EXPOSED_PENALTY: f64 = 0.06;

// --- Combat: timing ---

/// First-shot delay for a perfect-reaction agent (seconds).
pub const REACTION_DELAY_BASE: f64 = 0.15;

/// Additional first-shot delay for a zero-reaction agent (seconds).
pub const REACTION_DELAY_SPAN: f64 = 0.45;

/// First-shot delay added per unit of flash fraction (seconds).
pub const FLASH_DELAY_PENALTY: f64 = 0.60;

/// First-shot delay bounds (seconds).
pub const MIN_FIRST_SHOT_DELAY: f64 = 0.08;
pub const MAX_FIRST_SHOT_DELAY: f64 = 1.25;

/// Duel simulation step (seconds).
pub const EXCHANGE_DT: f64 = 1.0 / 30.0;

/// Duel simulation time budget (seconds).
pub const EXCHANGE_TIME_BUDGET: f64 = 3.0;

// --- Combat: spray & locations ---

/// Accuracy lost per consecutive shot, before the super-linear growth.
pub const SPRAY_PENALTY_BASE: f64 = 0.035;

/// Spray penalty grows with shot index to this power.
pub const SPRAY_PENALTY_EXPONENT: f64 = 1.5;

/// Fraction of the spray penalty a perfect-composure agent recovers.
pub const SPRAY_COMPOSURE_OFFSET: f64 = 0.5;

/// Headshot chance floor, skill gain, and ceiling.
pub const HEAD_CHANCE_BASE: f64 = 0.08;
pub const HEAD_CHANCE_SKILL_GAIN: f64 = 0.30;
pub const HEAD_CHANCE_FLOOR: f64 = 0.02;
pub const HEAD_CHANCE_CEILING: f64 = 0.55;

/// Headshot chance lost per consecutive-shot index.
pub const HEAD_CHANCE_SPRAY_LOSS: f64 = 0.04;

/// Headshot chance lost for a fully covered target.
pub const HEAD_CHANCE_COVER_LOSS: f64 = 0.10;

/// Non-head hits split chest/stomach/legs in these proportions.
pub const CHEST_SHARE: f64 = 0.50;
pub const STOMACH_SHARE: f64 = 0.30;

/// Location damage multipliers.
pub const STOMACH_MULTIPLIER: f64 = 1.25;
pub const LEG_MULTIPLIER: f64 = 0.75;

/// Head multiplier used when a weapon does not define one.
pub const DEFAULT_HEAD_MULTIPLIER: f64 = 4.0;

/// Largest location multiplier any hit can apply.
pub const MAX_LOCATION_MULTIPLIER: f64 = DEFAULT_HEAD_MULTIPLIER;

/// Damage falloff is applied once per this many map units of range.
pub const FALLOFF_UNIT: f64 = 100.0;

/// Minimum damage per landed bullet.
pub const MIN_DAMAGE: i32 = 1;

/// Agent hit points at round start.
pub const FULL_HEALTH: i32 = 100;

// --- Engagements ---

/// Cooldown between duels for the same agent (ticks).
pub const ENGAGE_COOLDOWN_TICKS: u64 = 10;

/// Suppression applied to a duel survivor who took damage (ticks).
pub const SUPPRESSION_TICKS: u64 = 15;

/// Full flash blindness duration; the flash fraction decays linearly
/// over this many ticks.
pub const FLASH_DURATION_TICKS: u64 = 20;

/// A suppressed agent fights as if flashed by at least this fraction.
pub const SUPPRESSION_FLASH_EQUIV: f64 = 0.2;

// --- Zone noise ---

/// Per-tick multiplicative decay of ambient zone noise.
pub const NOISE_DECAY: f64 = 0.95;

/// Noise added to a zone by an exchange of fire, and by a kill.
pub const NOISE_GUNFIRE: f64 = 1.0;
pub const NOISE_KILL: f64 = 2.0;

// --- Spotted reports ---

/// Base delivery delay for a spotted report (seconds).
pub const SPOTTED_DELAY_BASE: f64 = 0.3;

/// Additional delay for a zero-composure listener (seconds).
pub const SPOTTED_DELAY_SPAN: f64 = 0.5;
