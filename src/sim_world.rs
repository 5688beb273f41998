//! In-memory world used by the tests and the `simulate` binary.
//!
//! Combat here is a flat damage-per-second model; it only exists to move the
//! autopilot through its states.

use std::collections::BTreeMap;

use crate::error::WorldError;
use crate::types::{
    AuraDuration, CharacterClass, MapId, MovementId, OutboundKind, OutboundMessage, PlayerHandles,
    PlayerId, Position, SpellId, Team, UnitId, UnitState,
};
use crate::world::{GameWorld, GraveyardLookup, SessionChannel, WorldResult};

const MOVE_SPEED: f32 = 7.0;
const MELEE_REACH: f32 = 5.0;
const AGGRO_RADIUS: f32 = 12.0;
const ARRIVE_EPSILON: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpellEffect {
    Aura(AuraDuration),
    Heal(u32),
    Damage(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum WorldAction {
    Cast {
        caster: UnitId,
        target: UnitId,
        spell: SpellId,
    },
    Move {
        mover: MovementId,
        map: MapId,
        destination: Position,
    },
    ClearMovement {
        mover: MovementId,
    },
    Face {
        unit: UnitId,
        angle: f32,
    },
    Attack {
        unit: UnitId,
        target: UnitId,
    },
    StopCombat {
        unit: UnitId,
    },
    Repop {
        unit: UnitId,
    },
}

#[derive(Clone, Debug)]
pub struct SimUnit {
    pub state: UnitState,
    pub hostile: bool,
    pub auras: BTreeMap<SpellId, AuraDuration>,
    pub attack_target: Option<UnitId>,
    pub destination: Option<Position>,
    pub damage_per_sec: u32,
    damage_buffer: f32,
}

#[derive(Clone, Debug)]
struct Graveyard {
    map: MapId,
    team: Option<Team>,
    position: Position,
}

#[derive(Clone, Debug, Default)]
pub struct SimWorld {
    units: BTreeMap<UnitId, SimUnit>,
    movers: BTreeMap<MovementId, UnitId>,
    spells: BTreeMap<SpellId, SpellEffect>,
    graveyards: Vec<Graveyard>,
    ground: Option<f32>,
    next_id: u64,
    pub actions: Vec<WorldAction>,
    pub outbox: Vec<(PlayerId, OutboundMessage)>,
    pub chat: Vec<(PlayerId, String)>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn define_spell(&mut self, spell: SpellId, effect: SpellEffect) {
        self.spells.insert(spell, effect);
    }

    pub fn add_graveyard(&mut self, map: MapId, team: Option<Team>, position: Position) {
        self.graveyards.push(Graveyard {
            map,
            team,
            position,
        });
    }

    pub fn set_ground(&mut self, height: Option<f32>) {
        self.ground = height;
    }

    pub fn spawn_player(
        &mut self,
        class: CharacterClass,
        team: Team,
        map: MapId,
        position: Position,
    ) -> (PlayerId, PlayerHandles) {
        let unit = self.spawn_unit(class, team, map, position, 200, false);
        let movement = MovementId(unit.0);
        self.movers.insert(movement, unit);
        (PlayerId(unit.0), PlayerHandles { unit, movement })
    }

    pub fn spawn_hostile(&mut self, map: MapId, position: Position, health: u32) -> UnitId {
        let unit = self.spawn_unit(
            CharacterClass::Warrior,
            Team::Horde,
            map,
            position,
            health,
            true,
        );
        if let Some(sim) = self.units.get_mut(&unit) {
            sim.damage_per_sec = 6;
        }
        unit
    }

    fn spawn_unit(
        &mut self,
        class: CharacterClass,
        team: Team,
        map: MapId,
        position: Position,
        health: u32,
        hostile: bool,
    ) -> UnitId {
        let id = UnitId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.units.insert(
            id,
            SimUnit {
                state: UnitState {
                    position,
                    orientation: 0.0,
                    health,
                    max_health: health,
                    alive: true,
                    ghost: false,
                    class,
                    map,
                    team,
                    stopped: true,
                },
                hostile,
                auras: BTreeMap::new(),
                attack_target: None,
                destination: None,
                damage_per_sec: 12,
                damage_buffer: 0.0,
            },
        );
        id
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut SimUnit> {
        self.units.get_mut(&id)
    }

    pub fn hostile_ids(&self) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|(_, unit)| unit.hostile)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn despawn(&mut self, id: UnitId) {
        self.units.remove(&id);
        self.movers.retain(|_, unit| *unit != id);
        for unit in self.units.values_mut() {
            if unit.attack_target == Some(id) {
                unit.attack_target = None;
            }
        }
    }

    pub fn kill(&mut self, id: UnitId) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.state.health = 0;
            unit.state.alive = false;
            unit.attack_target = None;
            unit.destination = None;
            unit.state.stopped = true;
        }
        for unit in self.units.values_mut() {
            if unit.attack_target == Some(id) {
                unit.attack_target = None;
            }
        }
    }

    pub fn set_health(&mut self, id: UnitId, health: u32) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.state.health = health.min(unit.state.max_health);
        }
    }

    pub fn set_ghost(&mut self, id: UnitId, ghost: bool) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.state.ghost = ghost;
        }
    }

    pub fn set_position(&mut self, id: UnitId, position: Position) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.state.position = position;
        }
    }

    pub fn apply_aura(&mut self, id: UnitId, aura: SpellId, duration: AuraDuration) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.auras.insert(aura, duration);
        }
    }

    pub fn force_attack(&mut self, attacker: UnitId, target: UnitId) {
        if let Some(unit) = self.units.get_mut(&attacker) {
            unit.attack_target = Some(target);
        }
    }

    pub fn take_actions(&mut self) -> Vec<WorldAction> {
        std::mem::take(&mut self.actions)
    }

    /// Turns queued repop requests into ghosts. Returns the players released
    /// this call, still standing at their death location.
    pub fn process_outbox(&mut self) -> Vec<PlayerId> {
        let mut released = Vec::new();
        for (player, message) in std::mem::take(&mut self.outbox) {
            if message.kind != OutboundKind::RepopRequest {
                continue;
            }
            let Some(unit) = self.units.get_mut(&UnitId(player.0)) else {
                continue;
            };
            if unit.state.alive || unit.state.ghost {
                continue;
            }
            unit.state.ghost = true;
            released.push(player);
        }
        released
    }

    /// Moves every ghost to its nearest graveyard.
    pub fn move_ghosts_to_graveyards(&mut self) {
        let ghosts: Vec<(UnitId, Position, MapId, Team)> = self
            .units
            .iter()
            .filter(|(_, unit)| unit.state.ghost)
            .map(|(id, unit)| (*id, unit.state.position, unit.state.map, unit.state.team))
            .collect();
        for (id, position, map, team) in ghosts {
            if let Some(grave) = self.nearest_graveyard(position, map, team) {
                self.set_position(id, grave);
            }
        }
    }

    pub fn advance(&mut self, dt_ms: u32) {
        let dt_sec = dt_ms as f32 / 1000.0;
        self.advance_movement(dt_sec);
        self.advance_aggro();
        self.advance_combat(dt_sec);
        self.advance_auras(dt_ms);
        let fallen: Vec<UnitId> = self
            .units
            .iter()
            .filter(|(_, unit)| unit.hostile && !unit.state.alive)
            .map(|(id, _)| *id)
            .collect();
        for id in fallen {
            self.despawn(id);
        }
    }

    fn advance_movement(&mut self, dt_sec: f32) {
        for unit in self.units.values_mut() {
            let Some(destination) = unit.destination else {
                continue;
            };
            let distance = unit.state.position.distance_2d(&destination);
            let step = MOVE_SPEED * dt_sec;
            if distance <= step.max(ARRIVE_EPSILON) {
                unit.state.position = destination;
                unit.destination = None;
                unit.state.stopped = true;
            } else {
                let ratio = step / distance;
                unit.state.position.x += (destination.x - unit.state.position.x) * ratio;
                unit.state.position.y += (destination.y - unit.state.position.y) * ratio;
                unit.state.stopped = false;
            }
        }
    }

    fn advance_aggro(&mut self) {
        let players: Vec<(UnitId, Position)> = self
            .units
            .iter()
            .filter(|(_, unit)| !unit.hostile && unit.state.alive)
            .map(|(id, unit)| (*id, unit.state.position))
            .collect();
        for unit in self.units.values_mut() {
            if !unit.hostile || !unit.state.alive || unit.attack_target.is_some() {
                continue;
            }
            let position = unit.state.position;
            unit.attack_target = players
                .iter()
                .filter(|(_, p)| position.distance_2d(p) <= AGGRO_RADIUS)
                .min_by(|a, b| {
                    position
                        .distance_2d(&a.1)
                        .total_cmp(&position.distance_2d(&b.1))
                })
                .map(|(id, _)| *id);
        }
    }

    fn advance_combat(&mut self, dt_sec: f32) {
        let ids: Vec<UnitId> = self.units.keys().copied().collect();
        for id in ids {
            let Some((target, position, dps)) = self.units.get(&id).and_then(|unit| {
                if !unit.state.alive {
                    return None;
                }
                unit.attack_target
                    .map(|target| (target, unit.state.position, unit.damage_per_sec))
            }) else {
                continue;
            };
            let in_reach = self
                .units
                .get(&target)
                .map(|victim| {
                    victim.state.alive
                        && victim.state.position.distance_2d(&position) <= MELEE_REACH
                })
                .unwrap_or(false);
            if !in_reach {
                continue;
            }
            let mut damage = 0;
            if let Some(unit) = self.units.get_mut(&id) {
                unit.damage_buffer += dps as f32 * dt_sec;
                damage = unit.damage_buffer.floor() as u32;
                unit.damage_buffer -= damage as f32;
            }
            self.deal_damage(target, damage);
        }
    }

    fn advance_auras(&mut self, dt_ms: u32) {
        for unit in self.units.values_mut() {
            unit.auras.retain(|_, duration| match duration {
                AuraDuration::Permanent => true,
                AuraDuration::RemainingMs(remaining) => {
                    *remaining = remaining.saturating_sub(dt_ms);
                    *remaining > 0
                }
            });
        }
    }

    fn deal_damage(&mut self, target: UnitId, damage: u32) {
        let died = match self.units.get_mut(&target) {
            Some(victim) if victim.state.alive => {
                victim.state.health = victim.state.health.saturating_sub(damage);
                victim.state.health == 0
            }
            _ => false,
        };
        if died {
            self.kill(target);
        }
    }

    fn require(&self, id: UnitId) -> WorldResult<&SimUnit> {
        self.units.get(&id).ok_or(WorldError::MissingEntity(id))
    }

    fn require_mut(&mut self, id: UnitId) -> WorldResult<&mut SimUnit> {
        self.units.get_mut(&id).ok_or(WorldError::MissingEntity(id))
    }
}

impl GameWorld for SimWorld {
    fn unit(&self, id: UnitId) -> WorldResult<UnitState> {
        self.require(id).map(|unit| unit.state.clone())
    }

    fn aura(&self, id: UnitId, aura: SpellId) -> WorldResult<Option<AuraDuration>> {
        self.require(id).map(|unit| unit.auras.get(&aura).copied())
    }

    fn attackers(&self, id: UnitId) -> WorldResult<Vec<UnitId>> {
        self.require(id)?;
        Ok(self
            .units
            .iter()
            .filter(|(_, unit)| unit.state.alive && unit.attack_target == Some(id))
            .map(|(attacker, _)| *attacker)
            .collect())
    }

    fn nearest_hostile(&self, id: UnitId, radius: f32) -> WorldResult<Option<UnitId>> {
        let origin = self.require(id)?.state.clone();
        Ok(self
            .units
            .iter()
            .filter(|(other, unit)| {
                **other != id
                    && unit.hostile
                    && unit.state.alive
                    && unit.state.map == origin.map
                    && unit.state.position.distance_2d(&origin.position) <= radius
            })
            .min_by(|a, b| {
                let da = a.1.state.position.distance_2d(&origin.position);
                let db = b.1.state.position.distance_2d(&origin.position);
                da.total_cmp(&db)
            })
            .map(|(other, _)| *other))
    }

    fn ground_height(&self, _map: MapId, _x: f32, _y: f32, z: f32) -> f32 {
        self.ground.unwrap_or(z)
    }

    fn cast_spell(&mut self, caster: UnitId, target: UnitId, spell: SpellId) -> WorldResult<()> {
        self.require(caster)?;
        self.require(target)?;
        self.actions.push(WorldAction::Cast {
            caster,
            target,
            spell,
        });
        match self.spells.get(&spell).copied() {
            Some(SpellEffect::Aura(duration)) => self.apply_aura(target, spell, duration),
            Some(SpellEffect::Heal(amount)) => {
                if let Ok(unit) = self.require_mut(target) {
                    unit.state.health = (unit.state.health + amount).min(unit.state.max_health);
                }
            }
            Some(SpellEffect::Damage(amount)) => self.deal_damage(target, amount),
            None => {}
        }
        Ok(())
    }

    fn move_to_point(
        &mut self,
        mover: MovementId,
        map: MapId,
        destination: Position,
    ) -> WorldResult<()> {
        let unit = *self
            .movers
            .get(&mover)
            .ok_or(WorldError::MissingMovement(mover))?;
        self.actions.push(WorldAction::Move {
            mover,
            map,
            destination,
        });
        let sim = self.require_mut(unit)?;
        sim.destination = Some(destination);
        sim.state.stopped = false;
        Ok(())
    }

    fn clear_movement(&mut self, mover: MovementId) -> WorldResult<()> {
        let unit = *self
            .movers
            .get(&mover)
            .ok_or(WorldError::MissingMovement(mover))?;
        self.actions.push(WorldAction::ClearMovement { mover });
        let sim = self.require_mut(unit)?;
        sim.destination = None;
        sim.state.stopped = true;
        Ok(())
    }

    fn set_facing(&mut self, id: UnitId, angle: f32) -> WorldResult<()> {
        self.require_mut(id)?.state.orientation = angle;
        self.actions.push(WorldAction::Face { unit: id, angle });
        Ok(())
    }

    fn begin_attack(&mut self, id: UnitId, target: UnitId) -> WorldResult<()> {
        self.require(target)?;
        self.require_mut(id)?.attack_target = Some(target);
        self.actions.push(WorldAction::Attack { unit: id, target });
        Ok(())
    }

    fn stop_combat(&mut self, id: UnitId) -> WorldResult<()> {
        self.require_mut(id)?.attack_target = None;
        for unit in self.units.values_mut() {
            if unit.attack_target == Some(id) {
                unit.attack_target = None;
            }
        }
        self.actions.push(WorldAction::StopCombat { unit: id });
        Ok(())
    }

    fn repop_at_graveyard(&mut self, id: UnitId) -> WorldResult<()> {
        let state = self.require(id)?.state.clone();
        self.actions.push(WorldAction::Repop { unit: id });
        let grave = self.nearest_graveyard(state.position, state.map, state.team);
        let unit = self.require_mut(id)?;
        if let Some(grave) = grave {
            unit.state.position = grave;
        }
        if unit.state.ghost {
            unit.state.ghost = false;
            unit.state.alive = true;
            unit.state.health = (unit.state.max_health / 2).max(1);
        }
        Ok(())
    }
}

impl GraveyardLookup for SimWorld {
    fn nearest_graveyard(&self, position: Position, map: MapId, team: Team) -> Option<Position> {
        self.graveyards
            .iter()
            .filter(|grave| grave.map == map && grave.team.is_none_or(|t| t == team))
            .min_by(|a, b| {
                a.position
                    .distance_2d(&position)
                    .total_cmp(&b.position.distance_2d(&position))
            })
            .map(|grave| grave.position)
    }
}

impl SessionChannel for SimWorld {
    fn enqueue(&mut self, player: PlayerId, message: OutboundMessage) {
        self.outbox.push((player, message));
    }

    fn send_system_message(&mut self, player: PlayerId, text: &str) {
        self.chat.push((player, text.to_string()));
    }
}
