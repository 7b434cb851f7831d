//! The authoritative combat formulas: hit probability, shot timing,
//! body-location selection, and damage.
//!
//! All probabilities are clamped before use so degenerate inputs can
//! never produce a certain hit or a certain miss.

use rand::Rng;

use breach_core::components::SkillProfile;
use breach_core::constants::*;
use breach_core::enums::{HitLocation, PeekStyle};
use breach_core::weapons::WeaponStats;

/// Base aim score: a weighted blend of the shooter's aim-relevant skills,
/// normalized 0..1.
pub fn aim_score(skills: &SkillProfile) -> f64 {
    AIM_WEIGHT_CROSSHAIR * skills.crosshair
        + AIM_WEIGHT_FIRST_BULLET * skills.first_bullet
        + AIM_WEIGHT_POSITIONING * skills.positioning
        + AIM_WEIGHT_COMPOSURE * skills.composure
}

/// Accuracy lost to spraying: grows faster than linearly with the shot
/// index, partially recovered by composure.
pub fn spray_penalty(shot_index: u32, composure: f64) -> f64 {
    if shot_index == 0 {
        return 0.0;
    }
    let growth = (shot_index as f64).powf(SPRAY_PENALTY_EXPONENT);
    SPRAY_PENALTY_BASE * growth * (1.0 - SPRAY_COMPOSURE_OFFSET * composure.clamp(0.0, 1.0))
}

/// Probability that one bullet lands.
///
/// `favored` is true for the side holding the engagement initiative: the
/// pre-aimed defender against a peeker, or the peeking attacker when
/// nobody holds the angle.
#[allow(clippy::too_many_arguments)]
pub fn hit_probability(
    skills: &SkillProfile,
    weapon: &WeaponStats,
    distance: f64,
    shooter_moving: bool,
    shooter_flash: f64,
    target_moving: bool,
    target_cover: f64,
    cross_zone: bool,
    favored: bool,
    shot_index: u32,
) -> f64 {
    let mut p = aim_score(skills);

    p -= (distance / MAX_COMBAT_RANGE).min(1.0) * RANGE_PENALTY_MAX;
    p -= target_cover.clamp(0.0, 1.0) * COVER_PENALTY_MAX;
    if target_moving {
        p -= TARGET_MOVING_PENALTY;
    }
    if shooter_moving {
        p -= SHOOTER_MOVING_PENALTY;
    }
    p -= shooter_flash.clamp(0.0, 1.0) * FLASH_HIT_PENALTY;
    if cross_zone {
        p -= CROSS_ZONE_PENALTY;
    }
    p -= weapon.inaccuracy;
    p -= spray_penalty(shot_index, skills.composure);

    if favored {
        p += HOLD_ADVANTAGE;
    } else {
        p -= EXPOSED_PENALTY;
    }

    p.clamp(HIT_PROB_FLOOR, HIT_PROB_CEILING)
}

/// Delay before a side's first shot: reaction skill, peek style, and
/// flash blindness, clamped to a bounded range.
pub fn first_shot_delay(skills: &SkillProfile, peek: PeekStyle, flash: f64) -> f64 {
    let reaction = REACTION_DELAY_BASE + (1.0 - skills.reaction.clamp(0.0, 1.0)) * REACTION_DELAY_SPAN;
    let peek_mod = match peek {
        PeekStyle::Hold => 0.0,
        PeekStyle::Jiggle => 0.08,
        PeekStyle::Wide => 0.04,
        PeekStyle::Swing => -0.05,
    };
    let flash_mod = flash.clamp(0.0, 1.0) * FLASH_DELAY_PENALTY;
    (reaction + peek_mod + flash_mod).clamp(MIN_FIRST_SHOT_DELAY, MAX_FIRST_SHOT_DELAY)
}

/// Chance that a landed bullet strikes the head.
pub fn head_chance(skills: &SkillProfile, shot_index: u32, target_cover: f64) -> f64 {
    let precision = 0.6 * skills.crosshair + 0.4 * skills.first_bullet;
    let p = HEAD_CHANCE_BASE + HEAD_CHANCE_SKILL_GAIN * precision
        - HEAD_CHANCE_SPRAY_LOSS * shot_index as f64
        - HEAD_CHANCE_COVER_LOSS * target_cover.clamp(0.0, 1.0);
    p.clamp(HEAD_CHANCE_FLOOR, HEAD_CHANCE_CEILING)
}

/// Roll the body location for a landed bullet.
pub fn roll_location<R: Rng>(
    rng: &mut R,
    skills: &SkillProfile,
    shot_index: u32,
    target_cover: f64,
) -> HitLocation {
    if rng.gen_bool(head_chance(skills, shot_index, target_cover)) {
        return HitLocation::Head;
    }
    let roll: f64 = rng.gen();
    if roll < CHEST_SHARE {
        HitLocation::Chest
    } else if roll < CHEST_SHARE + STOMACH_SHARE {
        HitLocation::Stomach
    } else {
        HitLocation::Legs
    }
}

/// Damage for one landed bullet: base damage, range falloff, location
/// multiplier, armor penetration. Always an integer >= MIN_DAMAGE.
pub fn damage_for(
    weapon: &WeaponStats,
    distance: f64,
    location: HitLocation,
    vest: bool,
    helmet: bool,
) -> i32 {
    let falloff = weapon.falloff.powf(distance.max(0.0) / FALLOFF_UNIT);
    let mut dmg = weapon.base_damage * falloff;

    dmg *= match location {
        HitLocation::Head => weapon.head_multiplier.unwrap_or(DEFAULT_HEAD_MULTIPLIER),
        HitLocation::Chest => 1.0,
        HitLocation::Stomach => STOMACH_MULTIPLIER,
        HitLocation::Legs => LEG_MULTIPLIER,
    };

    let armored = match location {
        HitLocation::Head => helmet,
        HitLocation::Chest | HitLocation::Stomach => vest,
        HitLocation::Legs => false,
    };
    if armored {
        dmg *= weapon.armor_penetration;
    }

    (dmg as i32).max(MIN_DAMAGE)
}
