//! Per-tick control loop.
//!
//! Both timing buckets read one shared accumulator. The slow bucket fires at
//! [`SLOW_TICK_MS`] and resets it; the fast bucket fires on every tick where
//! the accumulator is at least [`FAST_TICK_MS`] after that reset. The fast
//! block therefore runs on each tick from 500ms onwards and is skipped on the
//! tick the slow block fires.

use tracing::{debug, warn};

use crate::config::AutopilotConfig;
use crate::constants::{ENGAGE_RANGE, FAST_TICK_MS, FRONT_ARC, SLOW_TICK_MS};
use crate::error::WorldError;
use crate::policy;
use crate::recovery::{classify, is_stuck};
use crate::registry::{SessionRecord, SessionRegistry};
use crate::targeting::{acquire_target, validate_target};
use crate::types::{ControllerEvent, LifeState, OutboundKind, Position, SpellId, UnitState};
use crate::world::{Host, WorldResult};

mod engage_system;
mod melee_system;
mod recovery_system;
mod utils;

use self::utils::{angle_to, approach_point, has_in_arc};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobalTimers {
    elapsed_ms: u32,
}

impl GlobalTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn advance(&mut self, delta_ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
    }

    /// Decides which buckets fire this tick, resetting the accumulator when
    /// the slow bucket does.
    pub fn take_buckets(&mut self) -> Buckets {
        let slow = self.elapsed_ms >= SLOW_TICK_MS;
        if slow {
            self.elapsed_ms = 0;
        }
        Buckets {
            slow,
            fast: self.elapsed_ms >= FAST_TICK_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Buckets {
    pub slow: bool,
    pub fast: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub buckets: Buckets,
    pub visited: usize,
    pub skipped: usize,
}

/// Runs one world update over every registered session.
pub fn tick<H: Host>(
    timers: &mut GlobalTimers,
    registry: &mut SessionRegistry,
    config: &AutopilotConfig,
    host: &mut H,
    delta_ms: u32,
    events: &mut Vec<ControllerEvent>,
) -> TickReport {
    timers.advance(delta_ms);
    registry.for_each(|record| record.outbound.begin_tick());

    let buckets = timers.take_buckets();
    let mut report = TickReport {
        buckets,
        ..TickReport::default()
    };
    let mut ctx = TickContext {
        host,
        config,
        events,
    };

    registry.for_each(|record| {
        report.visited += 1;
        if let Err(error) = ctx.run_session(record, buckets) {
            warn!(player = ?record.player_id, %error, "skipping session for this tick");
            ctx.events.push(ControllerEvent::SessionSkipped {
                player_id: record.player_id,
            });
            report.skipped += 1;
        }
    });
    report
}

struct TickContext<'a, H: Host> {
    host: &'a mut H,
    config: &'a AutopilotConfig,
    events: &'a mut Vec<ControllerEvent>,
}

impl<H: Host> TickContext<'_, H> {
    fn run_session(&mut self, record: &mut SessionRecord, buckets: Buckets) -> WorldResult<()> {
        let state = self.host.unit(record.unit)?;
        let life = classify(&state);
        self.observe_transition(record, life);

        if buckets.slow {
            match life {
                LifeState::Alive => self.engage(record, &state)?,
                LifeState::DeadGhost => self.recover_stuck_ghost(record, &state)?,
                LifeState::DeadAwaitingGhost => {}
            }
        }

        if buckets.fast && life == LifeState::Alive {
            self.melee_round(record, &state)?;
        }

        if life != LifeState::Alive {
            self.drop_target(record);
        }
        if life == LifeState::DeadAwaitingGhost {
            self.force_release(record)?;
        }
        Ok(())
    }

    fn observe_transition(&mut self, record: &mut SessionRecord, life: LifeState) {
        match (record.last_life, life) {
            (LifeState::DeadAwaitingGhost | LifeState::DeadGhost, LifeState::Alive) => {
                debug!(player = ?record.player_id, "player back in the world");
                record.clear_target();
                record.outbound.reset_cycle();
                record.recovery_point = None;
                self.events.push(ControllerEvent::Revived {
                    player_id: record.player_id,
                });
            }
            (LifeState::DeadAwaitingGhost, LifeState::DeadGhost) => {
                record.outbound.reset_cycle();
            }
            _ => {}
        }
        record.last_life = life;
    }

    fn drop_target(&mut self, record: &mut SessionRecord) {
        if let Some(target) = record.clear_target() {
            debug!(player = ?record.player_id, ?target, "target dropped");
            self.events.push(ControllerEvent::TargetLost {
                player_id: record.player_id,
                target,
            });
        }
    }

    /// Swallows a missing-target error by dropping the cached target. Any
    /// other error is handed back to the caller.
    fn recover_target_error(
        &mut self,
        record: &mut SessionRecord,
        error: WorldError,
    ) -> WorldResult<()> {
        match record.target {
            Some(target) if error.is_missing(target) => {
                self.drop_target(record);
                Ok(())
            }
            _ => Err(error),
        }
    }

    /// Drops a dead or vanished target, then acquires one if none is cached.
    fn refresh_target(&mut self, record: &mut SessionRecord) -> WorldResult<()> {
        self.discard_dead_target(record);
        if record.target.is_none() {
            self.acquire(record)?;
        }
        Ok(())
    }

    fn discard_dead_target(&mut self, record: &mut SessionRecord) {
        if let Some(target) = record.target {
            if validate_target(&*self.host, target).is_none() {
                self.drop_target(record);
            }
        }
    }

    fn acquire(&mut self, record: &mut SessionRecord) -> WorldResult<()> {
        if let Some(target) = acquire_target(&*self.host, record.unit)? {
            debug!(player = ?record.player_id, ?target, "target acquired");
            record.target = Some(target);
            self.events.push(ControllerEvent::TargetAcquired {
                player_id: record.player_id,
                target,
            });
        }
        Ok(())
    }

    fn cast_on_self(&mut self, record: &SessionRecord, spell: SpellId) -> WorldResult<()> {
        self.host.cast_spell(record.unit, record.unit, spell)?;
        self.events.push(ControllerEvent::SpellCast {
            player_id: record.player_id,
            spell,
            target: record.unit,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;
    use crate::constants::paladin;
    use crate::sim_world::{SimWorld, SpellEffect, WorldAction};
    use crate::types::{
        AuraDuration, CharacterClass, MapId, MovementId, OutboundMessage, PlayerHandles, PlayerId,
        Team, UnitId,
    };
    use crate::world::{GameWorld, GraveyardLookup, SessionChannel};

    const MAP: MapId = MapId(0);

    /// Delegates to a [`SimWorld`] but fails casts on one target.
    struct FlakyWorld {
        inner: SimWorld,
        fail_cast_on: Option<(UnitId, WorldError)>,
    }

    impl GameWorld for FlakyWorld {
        fn unit(&self, id: UnitId) -> WorldResult<UnitState> {
            self.inner.unit(id)
        }

        fn aura(&self, id: UnitId, aura: SpellId) -> WorldResult<Option<AuraDuration>> {
            self.inner.aura(id, aura)
        }

        fn attackers(&self, id: UnitId) -> WorldResult<Vec<UnitId>> {
            self.inner.attackers(id)
        }

        fn nearest_hostile(&self, id: UnitId, radius: f32) -> WorldResult<Option<UnitId>> {
            self.inner.nearest_hostile(id, radius)
        }

        fn ground_height(&self, map: MapId, x: f32, y: f32, z: f32) -> f32 {
            self.inner.ground_height(map, x, y, z)
        }

        fn cast_spell(
            &mut self,
            caster: UnitId,
            target: UnitId,
            spell: SpellId,
        ) -> WorldResult<()> {
            match &self.fail_cast_on {
                Some((unit, error)) if *unit == target => Err(error.clone()),
                _ => self.inner.cast_spell(caster, target, spell),
            }
        }

        fn move_to_point(
            &mut self,
            mover: MovementId,
            map: MapId,
            destination: Position,
        ) -> WorldResult<()> {
            self.inner.move_to_point(mover, map, destination)
        }

        fn clear_movement(&mut self, mover: MovementId) -> WorldResult<()> {
            self.inner.clear_movement(mover)
        }

        fn set_facing(&mut self, id: UnitId, angle: f32) -> WorldResult<()> {
            self.inner.set_facing(id, angle)
        }

        fn begin_attack(&mut self, id: UnitId, target: UnitId) -> WorldResult<()> {
            self.inner.begin_attack(id, target)
        }

        fn stop_combat(&mut self, id: UnitId) -> WorldResult<()> {
            self.inner.stop_combat(id)
        }

        fn repop_at_graveyard(&mut self, id: UnitId) -> WorldResult<()> {
            self.inner.repop_at_graveyard(id)
        }
    }

    impl GraveyardLookup for FlakyWorld {
        fn nearest_graveyard(
            &self,
            position: Position,
            map: MapId,
            team: Team,
        ) -> Option<Position> {
            self.inner.nearest_graveyard(position, map, team)
        }
    }

    impl SessionChannel for FlakyWorld {
        fn enqueue(&mut self, player: PlayerId, message: OutboundMessage) {
            self.inner.enqueue(player, message);
        }

        fn send_system_message(&mut self, player: PlayerId, text: &str) {
            self.inner.send_system_message(player, text);
        }
    }

    struct Harness<H> {
        world: H,
        registry: SessionRegistry,
        timers: GlobalTimers,
        config: AutopilotConfig,
        events: Vec<ControllerEvent>,
    }

    impl<H: Host> Harness<H> {
        fn new(world: H) -> Self {
            Self {
                world,
                registry: SessionRegistry::new(),
                timers: GlobalTimers::new(),
                config: AutopilotConfig::default(),
                events: Vec::new(),
            }
        }

        fn register(&mut self, player: PlayerId, handles: PlayerHandles) {
            assert!(self.registry.register(player, handles));
        }

        fn tick(&mut self, delta_ms: u32) -> TickReport {
            tick(
                &mut self.timers,
                &mut self.registry,
                &self.config,
                &mut self.world,
                delta_ms,
                &mut self.events,
            )
        }

        fn record(&self, player: PlayerId) -> &SessionRecord {
            self.registry.get(player).expect("registered session")
        }

        fn count_events(&self, matches: impl Fn(&ControllerEvent) -> bool) -> usize {
            self.events.iter().filter(|event| matches(event)).count()
        }
    }

    fn spawn_paladin(world: &mut SimWorld, position: Position) -> (PlayerId, PlayerHandles) {
        world.spawn_player(CharacterClass::Paladin, Team::Alliance, MAP, position)
    }

    fn casts_of(world: &SimWorld, wanted: SpellId) -> usize {
        world
            .actions
            .iter()
            .filter(|action| matches!(action, WorldAction::Cast { spell, .. } if *spell == wanted))
            .count()
    }

    fn last_move(world: &SimWorld) -> Option<Position> {
        world.actions.iter().rev().find_map(|action| match action {
            WorldAction::Move { destination, .. } => Some(*destination),
            _ => None,
        })
    }

    #[test]
    fn buckets_share_one_accumulator() {
        let mut timers = GlobalTimers::new();
        let mut fired = Vec::new();
        for _ in 0..55 {
            timers.advance(100);
            fired.push(timers.take_buckets());
        }

        let idle = Buckets::default();
        assert!(fired[..4].iter().all(|buckets| *buckets == idle));
        assert!(fired[4..49]
            .iter()
            .all(|buckets| buckets.fast && !buckets.slow));
        assert_eq!(
            fired[49],
            Buckets {
                slow: true,
                fast: false
            }
        );
        assert!(fired[50..54].iter().all(|buckets| *buckets == idle));
        assert!(fired[54].fast);
    }

    #[test]
    fn slow_bucket_discards_overshoot() {
        let mut timers = GlobalTimers::new();
        timers.advance(5_600);
        assert_eq!(
            timers.take_buckets(),
            Buckets {
                slow: true,
                fast: false
            }
        );
        assert_eq!(timers.elapsed_ms(), 0);
    }

    #[test]
    fn slow_block_reaches_every_session_on_the_same_tick() {
        let mut world = SimWorld::new();
        let (first, first_handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let (second, second_handles) = spawn_paladin(&mut world, Position::new(20.0, 0.0, 0.0));
        world.spawn_hostile(MAP, Position::new(10.0, 10.0, 0.0), 80);
        let mut harness = Harness::new(world);
        harness.register(first, first_handles);
        harness.register(second, second_handles);

        let report = harness.tick(5_000);

        assert!(report.buckets.slow);
        assert_eq!(report.visited, 2);
        for player in [first, second] {
            let moves = harness.count_events(|event| match event {
                ControllerEvent::MoveIssued { player_id, .. } => *player_id == player,
                _ => false,
            });
            assert_eq!(moves, 1, "player {player:?} should close on the hostile");
        }
    }

    #[test]
    fn approach_uses_offset_and_ground_height() {
        let mut world = SimWorld::new();
        world.set_ground(Some(7.5));
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let hostile = world.spawn_hostile(MAP, Position::new(10.0, 10.0, 3.0), 80);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(5_000);

        assert_eq!(
            last_move(&harness.world),
            Some(Position::new(9.0, 9.0, 7.5))
        );
        let clear_index = harness
            .world
            .actions
            .iter()
            .position(|action| matches!(action, WorldAction::ClearMovement { .. }));
        let move_index = harness
            .world
            .actions
            .iter()
            .position(|action| matches!(action, WorldAction::Move { .. }));
        assert!(clear_index < move_index);
        assert!(harness.events.contains(&ControllerEvent::AttackStarted {
            player_id: player,
            target: hostile,
        }));
    }

    #[test]
    fn target_within_engage_range_needs_no_movement() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let hostile = world.spawn_hostile(MAP, Position::new(1.0, 1.0, 0.0), 80);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(5_000);

        assert_eq!(harness.record(player).target, Some(hostile));
        assert_eq!(last_move(&harness.world), None);
    }

    #[test]
    fn slow_tick_casts_missing_auras_on_self() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::default());
        world.apply_aura(handles.unit, paladin::DEVOTION_AURA, AuraDuration::Permanent);
        world.apply_aura(
            handles.unit,
            paladin::BLESSING_OF_MIGHT,
            AuraDuration::RemainingMs(60_000),
        );
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(5_000);

        assert_eq!(casts_of(&harness.world, paladin::DEVOTION_AURA), 0);
        assert_eq!(casts_of(&harness.world, paladin::BLESSING_OF_MIGHT), 0);
        assert_eq!(casts_of(&harness.world, paladin::SEAL_OF_RIGHTEOUSNESS), 1);
    }

    #[test]
    fn low_health_heals_once_and_not_on_slow_tick() {
        let mut world = SimWorld::new();
        world.define_spell(paladin::HOLY_LIGHT, SpellEffect::Heal(100));
        let (player, handles) = spawn_paladin(&mut world, Position::default());
        world.set_health(handles.unit, 60);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(5_000);
        assert_eq!(casts_of(&harness.world, paladin::HOLY_LIGHT), 0);

        harness.tick(500);
        assert_eq!(casts_of(&harness.world, paladin::HOLY_LIGHT), 1);
        assert_eq!(harness.world.unit(handles.unit).map(|s| s.health), Ok(160));

        harness.tick(100);
        assert_eq!(casts_of(&harness.world, paladin::HOLY_LIGHT), 1);
    }

    #[test]
    fn dead_target_is_replaced_before_moving() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let first = world.spawn_hostile(MAP, Position::new(10.0, 0.0, 0.0), 80);
        let second = world.spawn_hostile(MAP, Position::new(0.0, 20.0, 0.0), 80);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(5_000);
        assert_eq!(harness.record(player).target, Some(first));

        harness.world.kill(first);
        harness.world.take_actions();
        harness.tick(5_000);

        assert_eq!(harness.record(player).target, Some(second));
        assert!(harness.events.contains(&ControllerEvent::TargetLost {
            player_id: player,
            target: first,
        }));
        let moves: Vec<Position> = harness
            .world
            .actions
            .iter()
            .filter_map(|action| match action {
                WorldAction::Move { destination, .. } => Some(*destination),
                _ => None,
            })
            .collect();
        assert_eq!(moves, vec![Position::new(-1.0, 19.0, 0.0)]);
    }

    #[test]
    fn fast_tick_casts_melee_spell_on_cached_target() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let hostile = world.spawn_hostile(MAP, Position::new(1.5, 0.0, 0.0), 80);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(500);
        assert_eq!(harness.record(player).target, Some(hostile));
        assert_eq!(casts_of(&harness.world, paladin::JUDGEMENT), 0);

        harness.tick(100);
        assert!(harness.world.actions.contains(&WorldAction::Cast {
            caster: handles.unit,
            target: hostile,
            spell: paladin::JUDGEMENT,
        }));
    }

    #[test]
    fn turns_to_face_target_behind() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        world.spawn_hostile(MAP, Position::new(-1.5, 0.0, 0.0), 80);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(500);

        let facing = harness.world.actions.iter().find_map(|action| match action {
            WorldAction::Face { unit, angle } if *unit == handles.unit => Some(*angle),
            _ => None,
        });
        let angle = facing.expect("player should turn around");
        assert!((angle - PI).abs() < 1e-5);
    }

    #[test]
    fn target_in_front_needs_no_turn() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let hostile = world.spawn_hostile(MAP, Position::new(1.5, 0.0, 0.0), 80);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(500);

        assert!(harness.world.actions.contains(&WorldAction::Attack {
            unit: handles.unit,
            target: hostile,
        }));
        assert!(!harness
            .world
            .actions
            .iter()
            .any(|action| matches!(action, WorldAction::Face { .. })));
    }

    #[test]
    fn vanished_target_is_dropped_without_skipping_session() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let hostile = world.spawn_hostile(MAP, Position::new(1.5, 0.0, 0.0), 80);
        let mut harness = Harness::new(FlakyWorld {
            inner: world,
            fail_cast_on: None,
        });
        harness.register(player, handles);
        harness.tick(500);
        assert_eq!(harness.record(player).target, Some(hostile));

        harness.world.fail_cast_on = Some((hostile, WorldError::MissingEntity(hostile)));
        let report = harness.tick(100);

        assert_eq!(report.skipped, 0);
        assert!(harness.events.contains(&ControllerEvent::TargetLost {
            player_id: player,
            target: hostile,
        }));
    }

    #[test]
    fn unrelated_world_error_skips_session_and_keeps_target() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let hostile = world.spawn_hostile(MAP, Position::new(1.5, 0.0, 0.0), 80);
        let mut harness = Harness::new(FlakyWorld {
            inner: world,
            fail_cast_on: None,
        });
        harness.register(player, handles);
        harness.tick(500);

        harness.world.fail_cast_on = Some((hostile, WorldError::MissingEntity(UnitId(999))));
        let report = harness.tick(100);

        assert_eq!(report.skipped, 1);
        assert!(harness
            .events
            .contains(&ControllerEvent::SessionSkipped { player_id: player }));
        assert_eq!(harness.record(player).target, Some(hostile));
    }

    #[test]
    fn missing_player_skips_only_that_session() {
        let mut world = SimWorld::new();
        let (gone, gone_handles) = spawn_paladin(&mut world, Position::default());
        let (present, present_handles) = spawn_paladin(&mut world, Position::default());
        world.despawn(gone_handles.unit);
        let mut harness = Harness::new(world);
        harness.register(gone, gone_handles);
        harness.register(present, present_handles);

        let report = harness.tick(5_000);

        assert_eq!(report.visited, 2);
        assert_eq!(report.skipped, 1);
        assert!(harness
            .events
            .contains(&ControllerEvent::SessionSkipped { player_id: gone }));
        assert_eq!(casts_of(&harness.world, paladin::DEVOTION_AURA), 1);
    }

    #[test]
    fn dead_player_requests_release_exactly_once() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::default());
        world.kill(handles.unit);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(100);
        assert!(harness
            .record(player)
            .outbound
            .is_pending(OutboundKind::RepopRequest));

        for _ in 0..4 {
            harness.tick(100);
            assert_eq!(harness.record(player).outbound.pending_len(), 0);
        }

        assert_eq!(harness.world.outbox.len(), 1);
        assert_eq!(
            harness.count_events(|event| matches!(event, ControllerEvent::RepopRequested { .. })),
            1
        );
        let stops = harness
            .world
            .actions
            .iter()
            .filter(|action| matches!(action, WorldAction::StopCombat { .. }))
            .count();
        assert_eq!(stops, 5);
    }

    #[test]
    fn death_drops_cached_target() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::new(0.0, 0.0, 0.0));
        let hostile = world.spawn_hostile(MAP, Position::new(1.5, 0.0, 0.0), 80);
        let mut harness = Harness::new(world);
        harness.register(player, handles);
        harness.tick(500);
        assert_eq!(harness.record(player).target, Some(hostile));

        harness.world.kill(handles.unit);
        harness.tick(100);

        assert_eq!(harness.record(player).target, None);
        assert!(harness.events.contains(&ControllerEvent::TargetLost {
            player_id: player,
            target: hostile,
        }));
    }

    #[test]
    fn stuck_ghost_is_respawned_only_once_recovery_point_is_known() {
        let grave = Position::new(30.0, 0.0, 0.0);
        let mut world = SimWorld::new();
        world.add_graveyard(MAP, None, grave);
        let (player, handles) = spawn_paladin(&mut world, grave);
        world.kill(handles.unit);
        world.set_ghost(handles.unit, true);
        let mut harness = Harness::new(world);
        harness.register(player, handles);

        harness.tick(5_000);
        assert!(!harness
            .world
            .actions
            .contains(&WorldAction::Repop { unit: handles.unit }));

        if let Some(record) = harness.registry.get_mut(player) {
            record.recovery_point = Some(grave);
        }
        harness.tick(5_000);
        assert!(harness
            .world
            .actions
            .contains(&WorldAction::Repop { unit: handles.unit }));
        assert!(harness
            .events
            .contains(&ControllerEvent::ForcedRespawn { player_id: player }));

        harness.tick(100);
        assert!(harness
            .events
            .contains(&ControllerEvent::Revived { player_id: player }));
        assert_eq!(harness.record(player).recovery_point, None);
    }

    #[test]
    fn revive_starts_a_new_release_cycle() {
        let mut world = SimWorld::new();
        let (player, handles) = spawn_paladin(&mut world, Position::default());
        world.kill(handles.unit);
        let mut harness = Harness::new(world);
        harness.register(player, handles);
        harness.tick(100);
        assert!(harness
            .record(player)
            .outbound
            .is_latched(OutboundKind::RepopRequest));

        if let Some(unit) = harness.world.unit_mut(handles.unit) {
            unit.state.alive = true;
            unit.state.health = 100;
        }
        harness.tick(100);
        assert!(!harness
            .record(player)
            .outbound
            .is_latched(OutboundKind::RepopRequest));

        harness.world.kill(handles.unit);
        harness.tick(100);
        assert_eq!(harness.world.outbox.len(), 2);
    }
}
