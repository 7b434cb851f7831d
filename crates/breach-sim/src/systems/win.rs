//! Win-condition evaluation, in fixed priority order.
//!
//! Pure over the current state: calling it twice within a tick yields
//! the same answer and scores nothing by itself, so the engine can
//! guard the actual transition.

use hecs::World;

use breach_core::components::{Agent, Health, SideTag};
use breach_core::enums::{BombState, Side, WinReason};

/// Evaluate the round in fixed priority order:
/// detonation, defusal, defenders eliminated (only while the bomb is
/// not planted), attackers eliminated, then round-clock expiry (which a
/// planted bomb overrides).
pub fn evaluate(
    world: &World,
    bomb: &BombState,
    live_ticks_remaining: u64,
) -> Option<(Side, WinReason)> {
    if matches!(bomb, BombState::Detonated) {
        return Some((Side::Attack, WinReason::Detonation));
    }
    if matches!(bomb, BombState::Defused) {
        return Some((Side::Defense, WinReason::Defusal));
    }

    let attackers_alive = count_alive(world, Side::Attack);
    let defenders_alive = count_alive(world, Side::Defense);

    if defenders_alive == 0 && !bomb.is_planted() {
        return Some((Side::Attack, WinReason::DefendersEliminated));
    }
    if attackers_alive == 0 {
        return Some((Side::Defense, WinReason::AttackersEliminated));
    }
    if live_ticks_remaining == 0 && !bomb.is_planted() {
        return Some((Side::Defense, WinReason::TimeExpired));
    }
    None
}

fn count_alive(world: &World, side: Side) -> usize {
    world
        .query::<(&Agent, &SideTag, &Health)>()
        .iter()
        .filter(|(_, (_, tag, health))| tag.0 == side && health.alive)
        .count()
}
