//! Static weapon stat table.
//!
//! Stats are data, not behavior: the combat resolver interprets them.

use serde::{Deserialize, Serialize};

use crate::enums::WeaponKind;

/// Stats for one weapon kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Shots per second.
    pub rate_of_fire: f64,
    /// Damage per bullet before falloff, location, and armor.
    pub base_damage: f64,
    /// Multiplicative damage retained per `FALLOFF_UNIT` of range.
    pub falloff: f64,
    /// Head multiplier. `None` falls back to `DEFAULT_HEAD_MULTIPLIER`.
    pub head_multiplier: Option<f64>,
    /// Fraction of damage that penetrates armor on an armored location.
    pub armor_penetration: f64,
    /// Flat hit-probability penalty for the weapon's handling.
    pub inaccuracy: f64,
    /// Range beyond which the weapon is badly outmatched (map units).
    pub effective_range: f64,
}

/// Look up the stat block for a weapon kind.
pub fn weapon_stats(kind: WeaponKind) -> WeaponStats {
    match kind {
        WeaponKind::Pistol => WeaponStats {
            rate_of_fire: 6.0,
            base_damage: 35.0,
            falloff: 0.90,
            head_multiplier: Some(4.0),
            armor_penetration: 0.52,
            inaccuracy: 0.06,
            effective_range: 500.0,
        },
        WeaponKind::HeavyPistol => WeaponStats {
            rate_of_fire: 3.5,
            base_damage: 63.0,
            falloff: 0.91,
            head_multiplier: Some(4.0),
            armor_penetration: 0.93,
            inaccuracy: 0.09,
            effective_range: 600.0,
        },
        WeaponKind::Smg => WeaponStats {
            rate_of_fire: 13.3,
            base_damage: 26.0,
            falloff: 0.85,
            head_multiplier: Some(4.0),
            armor_penetration: 0.58,
            inaccuracy: 0.07,
            effective_range: 600.0,
        },
        WeaponKind::Shotgun => WeaponStats {
            rate_of_fire: 1.1,
            base_damage: 86.0,
            falloff: 0.45,
            head_multiplier: None,
            armor_penetration: 0.75,
            inaccuracy: 0.12,
            effective_range: 250.0,
        },
        WeaponKind::Rifle => WeaponStats {
            rate_of_fire: 10.0,
            base_damage: 33.0,
            falloff: 0.97,
            head_multiplier: Some(4.0),
            armor_penetration: 0.78,
            inaccuracy: 0.03,
            effective_range: 1_400.0,
        },
        WeaponKind::BurstRifle => WeaponStats {
            rate_of_fire: 8.0,
            base_damage: 30.0,
            falloff: 0.96,
            head_multiplier: Some(3.5),
            armor_penetration: 0.70,
            inaccuracy: 0.04,
            effective_range: 1_200.0,
        },
        WeaponKind::Lmg => WeaponStats {
            rate_of_fire: 12.5,
            base_damage: 35.0,
            falloff: 0.95,
            head_multiplier: Some(3.0),
            armor_penetration: 0.80,
            inaccuracy: 0.11,
            effective_range: 1_000.0,
        },
        WeaponKind::Sniper => WeaponStats {
            rate_of_fire: 0.9,
            base_damage: 115.0,
            falloff: 0.99,
            head_multiplier: Some(2.0),
            armor_penetration: 0.98,
            inaccuracy: 0.02,
            effective_range: 2_200.0,
        },
    }
}
