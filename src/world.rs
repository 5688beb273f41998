//! Collaborator interfaces the autopilot drives.
//!
//! The host owns every entity. The autopilot only holds ids and resolves them
//! through these traits each time it needs them; a unit that has despawned
//! resolves to [`WorldError::MissingEntity`].

use crate::error::WorldError;
use crate::types::{
    AuraDuration, MapId, MovementId, OutboundMessage, PlayerId, Position, SpellId, Team, UnitId,
    UnitState,
};

pub type WorldResult<T> = Result<T, WorldError>;

pub trait GameWorld {
    fn unit(&self, id: UnitId) -> WorldResult<UnitState>;

    fn aura(&self, id: UnitId, aura: SpellId) -> WorldResult<Option<AuraDuration>>;

    /// Units currently attacking `id`, in the world's attacker-set order.
    fn attackers(&self, id: UnitId) -> WorldResult<Vec<UnitId>>;

    fn nearest_hostile(&self, id: UnitId, radius: f32) -> WorldResult<Option<UnitId>>;

    /// Ground height at (x, y), falling back to `z` when the map has no data.
    fn ground_height(&self, map: MapId, x: f32, y: f32, z: f32) -> f32;

    fn cast_spell(&mut self, caster: UnitId, target: UnitId, spell: SpellId) -> WorldResult<()>;

    fn move_to_point(
        &mut self,
        mover: MovementId,
        map: MapId,
        destination: Position,
    ) -> WorldResult<()>;

    fn clear_movement(&mut self, mover: MovementId) -> WorldResult<()>;

    fn set_facing(&mut self, id: UnitId, angle: f32) -> WorldResult<()>;

    fn begin_attack(&mut self, id: UnitId, target: UnitId) -> WorldResult<()>;

    fn stop_combat(&mut self, id: UnitId) -> WorldResult<()>;

    fn repop_at_graveyard(&mut self, id: UnitId) -> WorldResult<()>;
}

pub trait GraveyardLookup {
    fn nearest_graveyard(&self, position: Position, map: MapId, team: Team) -> Option<Position>;
}

pub trait SessionChannel {
    /// Hands a one-shot message to the player's connection. Delivery is the
    /// host's responsibility.
    fn enqueue(&mut self, player: PlayerId, message: OutboundMessage);

    fn send_system_message(&mut self, player: PlayerId, text: &str);
}

/// Everything a tick needs from the host.
pub trait Host: GameWorld + GraveyardLookup + SessionChannel {}

impl<T: GameWorld + GraveyardLookup + SessionChannel> Host for T {}
