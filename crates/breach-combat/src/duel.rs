//! Duel simulation: both sides' shot timelines merged and resolved in
//! time order until a lethal hit or the exchange budget runs out.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use breach_core::components::SkillProfile;
use breach_core::constants::*;
use breach_core::enums::{HitLocation, PeekStyle, WeaponKind};
use breach_core::weapons::{weapon_stats, WeaponStats};

use crate::model;

/// One side of a duel: skills, equipment, and remaining health.
#[derive(Debug, Clone, Copy)]
pub struct Fighter {
    pub skills: SkillProfile,
    pub weapon: Option<WeaponKind>,
    pub hp: i32,
    pub vest: bool,
    pub helmet: bool,
}

/// Situational state for one side of an engagement.
#[derive(Debug, Clone, Copy)]
pub struct SideContext {
    pub peek: PeekStyle,
    pub moving: bool,
    /// Cover fraction 0..1 (how protected this side's position is).
    pub cover: f64,
    /// Flash blindness fraction 0..1.
    pub flash: f64,
    /// False when this side is already committed elsewhere and cannot
    /// return fire (one-sided exchange).
    pub can_fire: bool,
    /// Holding the angle the other side appears in.
    pub pre_aimed: bool,
}

impl Default for SideContext {
    fn default() -> Self {
        Self {
            peek: PeekStyle::Hold,
            moving: false,
            cover: 0.0,
            flash: 0.0,
            can_fire: true,
            pre_aimed: false,
        }
    }
}

/// Ephemeral description of one engagement. Constructed fresh per duel,
/// never persisted.
#[derive(Debug, Clone, Copy)]
pub struct EngagementContext {
    pub cross_zone: bool,
    pub attacker: SideContext,
    pub defender: SideContext,
}

/// Which side of the duel an event belongs to. The attacker is the side
/// that initiated the engagement (the peeker, usually).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelRole {
    Attacker,
    Defender,
}

impl DuelRole {
    fn other(self) -> DuelRole {
        match self {
            DuelRole::Attacker => DuelRole::Defender,
            DuelRole::Defender => DuelRole::Attacker,
        }
    }
}

/// One bullet in the resolved exchange.
#[derive(Debug, Clone, Copy)]
pub struct ShotRecord {
    /// Seconds from engagement start.
    pub t: f64,
    pub by: DuelRole,
    pub hit: bool,
    pub location: Option<HitLocation>,
    pub damage: i32,
}

/// Result of a resolved duel.
#[derive(Debug, Clone, Default)]
pub struct DuelOutcome {
    pub shots: Vec<ShotRecord>,
    pub damage_to_attacker: i32,
    pub damage_to_defender: i32,
    pub attacker_died: bool,
    pub defender_died: bool,
    /// Seconds into the exchange at which a lethal hit landed.
    pub decided_at: Option<f64>,
    /// The side that won (by kill), or dealt more damage when the budget
    /// ran out. `None` on an even trade of nothing.
    pub nominal_winner: Option<DuelRole>,
    /// Whether the lethal hit was a headshot.
    pub lethal_headshot: bool,
}

/// The weapon a side actually brings to bear, if it can fire at all.
fn firing_stats(fighter: &Fighter, side: &SideContext) -> Option<WeaponStats> {
    if side.can_fire {
        fighter.weapon.map(weapon_stats)
    } else {
        None
    }
}

/// Bullet timestamps and shot indices one side produces within the
/// budget. Fractional shots-per-step accumulate into discrete bullets,
/// starting from the side's first-shot delay.
fn bullet_times(stats: &WeaponStats, start_delay: f64) -> Vec<(f64, u32)> {
    let mut times = Vec::new();
    let mut t = start_delay;
    let mut accum = 1.0; // first bullet fires at the start delay
    let mut index = 0u32;
    while t <= EXCHANGE_TIME_BUDGET {
        if accum >= 1.0 {
            accum -= 1.0;
            times.push((t, index));
            index += 1;
        }
        accum += stats.rate_of_fire * EXCHANGE_DT;
        t += EXCHANGE_DT;
    }
    times
}

/// Resolve one engagement.
///
/// Simulates both sides' shot timelines and applies hits in time order;
/// the earliest lethal hit decides the duel. If nobody dies within the
/// budget, the side with more cumulative damage is the nominal winner
/// and no outcome is forced.
pub fn resolve(
    attacker: &Fighter,
    defender: &Fighter,
    distance: f64,
    ctx: &EngagementContext,
    rng: &mut ChaCha8Rng,
) -> DuelOutcome {
    // The pre-aimed defender is favored against a peeker; otherwise the
    // initiative belongs to the attacker.
    let attacker_favored = !ctx.defender.pre_aimed;

    let att_stats = firing_stats(attacker, &ctx.attacker);
    let def_stats = firing_stats(defender, &ctx.defender);
    let att_delay = model::first_shot_delay(&attacker.skills, ctx.attacker.peek, ctx.attacker.flash);
    let def_delay = model::first_shot_delay(&defender.skills, ctx.defender.peek, ctx.defender.flash);

    // Merge both timelines, attacker first on exact ties.
    let mut bullets: Vec<(f64, DuelRole, u32)> = Vec::new();
    if let Some(stats) = &att_stats {
        bullets.extend(
            bullet_times(stats, att_delay)
                .into_iter()
                .map(|(t, i)| (t, DuelRole::Attacker, i)),
        );
    }
    if let Some(stats) = &def_stats {
        bullets.extend(
            bullet_times(stats, def_delay)
                .into_iter()
                .map(|(t, i)| (t, DuelRole::Defender, i)),
        );
    }
    bullets.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| (a.1 == DuelRole::Defender).cmp(&(b.1 == DuelRole::Defender)))
    });

    let mut outcome = DuelOutcome::default();
    let mut att_hp = attacker.hp;
    let mut def_hp = defender.hp;

    for (t, role, shot_index) in bullets {
        if att_hp <= 0 || def_hp <= 0 {
            break; // A dead side neither fires nor receives further shots
        }

        let (shooter, shooter_side, target, target_side, stats, favored) = match role {
            DuelRole::Attacker => (
                attacker,
                &ctx.attacker,
                defender,
                &ctx.defender,
                att_stats,
                attacker_favored,
            ),
            DuelRole::Defender => (
                defender,
                &ctx.defender,
                attacker,
                &ctx.attacker,
                def_stats,
                !attacker_favored,
            ),
        };
        let Some(stats) = stats else {
            continue; // Weaponless or unable to return fire
        };

        let p = model::hit_probability(
            &shooter.skills,
            &stats,
            distance,
            shooter_side.moving,
            shooter_side.flash,
            target_side.moving,
            target_side.cover,
            ctx.cross_zone,
            favored,
            shot_index,
        );

        let hit = rng.gen_bool(p);
        let mut record = ShotRecord {
            t,
            by: role,
            hit,
            location: None,
            damage: 0,
        };

        if hit {
            let location = model::roll_location(rng, &shooter.skills, shot_index, target_side.cover);
            let damage = model::damage_for(&stats, distance, location, target.vest, target.helmet);
            record.location = Some(location);
            record.damage = damage;

            let target_hp = match role {
                DuelRole::Attacker => {
                    outcome.damage_to_defender += damage;
                    def_hp -= damage;
                    def_hp
                }
                DuelRole::Defender => {
                    outcome.damage_to_attacker += damage;
                    att_hp -= damage;
                    att_hp
                }
            };

            if target_hp <= 0 {
                outcome.decided_at = Some(t);
                outcome.nominal_winner = Some(role);
                outcome.lethal_headshot = location == HitLocation::Head;
                match role.other() {
                    DuelRole::Attacker => outcome.attacker_died = true,
                    DuelRole::Defender => outcome.defender_died = true,
                }
            }
        }

        outcome.shots.push(record);

        if outcome.decided_at.is_some() {
            break;
        }
    }

    if outcome.decided_at.is_none() {
        // Budget exhausted: more cumulative damage wins nominally.
        outcome.nominal_winner = match outcome
            .damage_to_defender
            .cmp(&outcome.damage_to_attacker)
        {
            std::cmp::Ordering::Greater => Some(DuelRole::Attacker),
            std::cmp::Ordering::Less => Some(DuelRole::Defender),
            std::cmp::Ordering::Equal => None,
        };
    }

    outcome
}
