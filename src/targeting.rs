//! Combat target selection.
//!
//! Units already attacking the player always win over idle hostiles, even
//! when an idle hostile stands closer.

use crate::constants::TARGET_SEARCH_RADIUS;
use crate::types::UnitId;
use crate::world::{GameWorld, WorldResult};

/// Picks the hostile `player` should engage.
///
/// Returns the nearest live attacker (earlier attacker-set entries win ties),
/// otherwise the nearest hostile within [`TARGET_SEARCH_RADIUS`]. Attackers
/// that no longer resolve are ignored. Errors only when `player` itself is
/// gone.
pub fn acquire_target<W: GameWorld + ?Sized>(
    world: &W,
    player: UnitId,
) -> WorldResult<Option<UnitId>> {
    let origin = world.unit(player)?.position;

    let mut best: Option<(UnitId, f32)> = None;
    for attacker in world.attackers(player)? {
        let Ok(state) = world.unit(attacker) else {
            continue;
        };
        if state.is_dead() {
            continue;
        }
        let distance = origin.distance_2d(&state.position);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((attacker, distance));
        }
    }
    if let Some((attacker, _)) = best {
        return Ok(Some(attacker));
    }

    world.nearest_hostile(player, TARGET_SEARCH_RADIUS)
}

/// Returns the cached target if it still resolves and is alive.
pub fn validate_target<W: GameWorld + ?Sized>(world: &W, target: UnitId) -> Option<UnitId> {
    match world.unit(target) {
        Ok(state) if state.alive => Some(target),
        _ => None,
    }
}
