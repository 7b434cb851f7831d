//! Engagement selection and resolution.
//!
//! All eligible pairs for a tick are decided on the positions computed
//! at the start of that tick; processing order is shuffled with the
//! seeded engine RNG so earlier-indexed agents get no systematic edge.

use std::collections::HashSet;

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use breach_core::components::*;
use breach_core::constants::*;
use breach_core::enums::{BombState, PeekStyle, WeaponKind};
use breach_core::events::MatchEvent;
use breach_core::map::MapDef;
use breach_core::types::{AgentId, Position};

use breach_combat::{resolve, DuelRole, EngagementContext, Fighter, SideContext};
use breach_nav::{NavigationGraph, VisibilityIndex};

use crate::systems::noise::NoiseField;
use crate::systems::spotting::VisiblePair;

/// Snapshot of one duelist taken before resolution.
struct Duelist {
    entity: Entity,
    id: AgentId,
    position: Position,
    skills: SkillProfile,
    weapon: Option<WeaponKind>,
    hp: i32,
    vest: bool,
    helmet: bool,
    moved: bool,
    flash: f64,
    cooldown_until: u64,
}

fn view(world: &World, entity: Entity, tick: u64) -> Option<Duelist> {
    let agent = world.get::<&Agent>(entity).ok()?;
    let health = world.get::<&Health>(entity).ok()?;
    if !health.alive {
        return None;
    }
    let position = *world.get::<&Position>(entity).ok()?;
    let skills = *world.get::<&SkillProfile>(entity).ok()?;
    let loadout = *world.get::<&Loadout>(entity).ok()?;
    let movement = world.get::<&Movement>(entity).ok()?;
    let combat = world.get::<&CombatState>(entity).ok()?;

    // Suppression degrades the next duel the way a weak flash would.
    let mut flash = combat.flash_fraction(tick, FLASH_DURATION_TICKS);
    if tick < combat.suppressed_until {
        flash = flash.max(SUPPRESSION_FLASH_EQUIV);
    }

    Some(Duelist {
        entity,
        id: agent.id,
        position,
        skills,
        weapon: loadout.weapon,
        hp: health.hp,
        vest: health.vest,
        helmet: health.helmet,
        moved: movement.moved_this_tick,
        flash,
        cooldown_until: combat.cooldown_until,
    })
}

fn fighter(d: &Duelist) -> Fighter {
    Fighter {
        skills: d.skills,
        weapon: d.weapon,
        hp: d.hp,
        vest: d.vest,
        helmet: d.helmet,
    }
}

fn peek_style(d: &Duelist, initiating: bool) -> PeekStyle {
    if !d.moved {
        return PeekStyle::Hold;
    }
    if !initiating {
        return PeekStyle::Jiggle;
    }
    if d.skills.aggression > 0.66 {
        PeekStyle::Swing
    } else if d.skills.aggression > 0.33 {
        PeekStyle::Wide
    } else {
        PeekStyle::Jiggle
    }
}

/// Resolve every eligible engagement for this tick.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    map: &MapDef,
    graph: &NavigationGraph,
    index: &VisibilityIndex,
    mut pairs: Vec<VisiblePair>,
    bomb: &mut BombState,
    noise: &mut NoiseField,
    events: &mut Vec<MatchEvent>,
    rng: &mut ChaCha8Rng,
    tick: u64,
) {
    pairs.shuffle(rng);

    let mut engaged: HashSet<Entity> = HashSet::new();

    for pair in pairs {
        let (Some(att), Some(def)) = (
            view(world, pair.attacker, tick),
            view(world, pair.defender, tick),
        ) else {
            continue; // One side already died this tick
        };

        // Busy = fought earlier this same tick (can be shot, cannot
        // return fire). Blocked = busy or still on engagement cooldown
        // (cannot take the initiative).
        let att_busy = engaged.contains(&att.entity);
        let def_busy = engaged.contains(&def.entity);
        let att_blocked = att_busy || tick < att.cooldown_until;
        let def_blocked = def_busy || tick < def.cooldown_until;
        if att_blocked && def_blocked {
            continue;
        }

        // Initiative: a blocked side cannot take it; otherwise the mover
        // peeks, and ties go to the more aggressive side.
        let (peeker, holder) = if att_blocked {
            (&def, &att)
        } else if def_blocked {
            (&att, &def)
        } else if att.moved != def.moved {
            if att.moved {
                (&att, &def)
            } else {
                (&def, &att)
            }
        } else if att.skills.aggression >= def.skills.aggression {
            (&att, &def)
        } else {
            (&def, &att)
        };
        let holder_busy = engaged.contains(&holder.entity);

        let distance = peeker.position.distance_to(&holder.position);
        let cross_zone = match (map.zone_at(&peeker.position), map.zone_at(&holder.position)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        };
        let cover_of = |d: &Duelist| {
            graph
                .nearest_node(&d.position)
                .map(|n| index.cover_score(n))
                .unwrap_or(0.0)
        };

        let ctx = EngagementContext {
            cross_zone,
            attacker: SideContext {
                peek: peek_style(peeker, true),
                moving: peeker.moved,
                cover: cover_of(peeker),
                flash: peeker.flash,
                can_fire: true,
                pre_aimed: false,
            },
            defender: SideContext {
                peek: peek_style(holder, false),
                moving: holder.moved,
                cover: cover_of(holder),
                flash: holder.flash,
                can_fire: !holder_busy,
                // Holding the angle only counts on first contact; in an
                // ongoing standoff both sides are already aware.
                pre_aimed: pair.new_this_tick && !holder.moved && !holder_busy,
            },
        };

        let outcome = resolve(&fighter(peeker), &fighter(holder), distance, &ctx, rng);

        engaged.insert(att.entity);
        engaged.insert(def.entity);

        // Gunfire noise at the midpoint of the exchange.
        if !outcome.shots.is_empty() {
            if let Some(zone) = map.nearest_zone(&peeker.position.lerp(&holder.position, 0.5)) {
                noise.add(zone, NOISE_GUNFIRE);
            }
        }

        apply_side(
            world,
            map,
            bomb,
            noise,
            events,
            peeker,
            holder,
            outcome.damage_to_defender,
            outcome.defender_died,
            outcome.lethal_headshot && outcome.nominal_winner == Some(DuelRole::Attacker),
            tick,
        );
        apply_side(
            world,
            map,
            bomb,
            noise,
            events,
            holder,
            peeker,
            outcome.damage_to_attacker,
            outcome.attacker_died,
            outcome.lethal_headshot && outcome.nominal_winner == Some(DuelRole::Defender),
            tick,
        );

        for entity in [att.entity, def.entity] {
            if let Ok(mut combat) = world.get::<&mut CombatState>(entity) {
                combat.cooldown_until = tick + ENGAGE_COOLDOWN_TICKS;
            }
        }
    }
}

/// Apply one direction of a duel outcome: damage from `shooter` into
/// `target`, plus death processing.
#[allow(clippy::too_many_arguments)]
fn apply_side(
    world: &mut World,
    map: &MapDef,
    bomb: &mut BombState,
    noise: &mut NoiseField,
    events: &mut Vec<MatchEvent>,
    shooter: &Duelist,
    target: &Duelist,
    damage: i32,
    died: bool,
    headshot: bool,
    tick: u64,
) {
    if damage <= 0 {
        return;
    }

    if let Ok(mut health) = world.get::<&mut Health>(target.entity) {
        health.hp = (health.hp - damage).max(0);
        if died {
            health.alive = false;
        }
    }

    if !died {
        // Survivors that took fire fight the next duel rattled.
        if let Ok(mut combat) = world.get::<&mut CombatState>(target.entity) {
            combat.suppressed_until = tick + SUPPRESSION_TICKS;
        }
        return;
    }

    if let Some(weapon) = shooter.weapon {
        events.push(MatchEvent::Kill {
            killer: shooter.id,
            victim: target.id,
            weapon,
            headshot,
        });
    }
    if let Some(zone) = map.nearest_zone(&target.position) {
        noise.add(zone, NOISE_KILL);
    }

    if let Ok(mut velocity) = world.get::<&mut breach_core::types::Velocity>(target.entity) {
        *velocity = breach_core::types::Velocity::zero();
    }
    if let Ok(mut movement) = world.get::<&mut Movement>(target.entity) {
        movement.goal = None;
        movement.waypoints.clear();
        movement.moved_this_tick = false;
    }
    if let Ok(mut loadout) = world.get::<&mut Loadout>(target.entity) {
        if let Some(weapon) = loadout.weapon.take() {
            events.push(MatchEvent::WeaponDropped {
                agent: target.id,
                weapon,
                position: target.position,
            });
        }
    }

    // The objective never dies with its agent.
    match *bomb {
        BombState::Carried { carrier } if carrier == target.id => {
            *bomb = BombState::Dropped {
                position: target.position,
            };
            events.push(MatchEvent::BombDropped {
                position: target.position,
            });
        }
        BombState::Planting { planter, .. } if planter == target.id => {
            events.push(MatchEvent::PlantAborted { agent: planter });
            *bomb = BombState::Dropped {
                position: target.position,
            };
            events.push(MatchEvent::BombDropped {
                position: target.position,
            });
        }
        BombState::Defusing {
            defuser,
            site,
            position,
            ticks_remaining,
            ticks_since_plant,
            ..
        } if defuser == target.id => {
            events.push(MatchEvent::DefuseAborted { agent: defuser });
            *bomb = BombState::Planted {
                site,
                position,
                ticks_remaining,
                ticks_since_plant,
            };
        }
        _ => {}
    }
}
