//! Death and ghost recovery rules.

use crate::constants::STUCK_GHOST_RADIUS;
use crate::types::{LifeState, Position, UnitId, UnitState};
use crate::world::{GameWorld, GraveyardLookup, WorldResult};

pub fn classify(state: &UnitState) -> LifeState {
    if state.alive {
        LifeState::Alive
    } else if state.ghost {
        LifeState::DeadGhost
    } else {
        LifeState::DeadAwaitingGhost
    }
}

/// A ghost idling next to the graveyard it was sent to has not managed to
/// respawn on its own.
pub fn is_stuck(state: &UnitState, recovery_point: Option<Position>) -> bool {
    if classify(state) != LifeState::DeadGhost {
        return false;
    }
    recovery_point
        .is_some_and(|point| state.position.distance_2d(&point) <= STUCK_GHOST_RADIUS)
}

/// Graveyard nearest to where `unit` currently stands. `Ok(None)` when the
/// lookup finds nothing for its map and team.
pub fn locate_recovery_point<W>(world: &W, unit: UnitId) -> WorldResult<Option<Position>>
where
    W: GameWorld + GraveyardLookup + ?Sized,
{
    let state = world.unit(unit)?;
    Ok(world.nearest_graveyard(state.position, state.map, state.team))
}
