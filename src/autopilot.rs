use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::config::AutopilotConfig;
use crate::constants::EVENT_LOG_CAPACITY;
use crate::recovery::locate_recovery_point;
use crate::registry::{SessionRecord, SessionRegistry};
use crate::scheduler::{self, GlobalTimers, TickReport};
use crate::types::{ControllerEvent, PlayerHandles, PlayerId};
use crate::world::Host;

/// Notifications the host delivers to the autopilot.
pub trait LifecycleHooks<H: Host> {
    fn on_login(&mut self, host: &mut H, player: PlayerId, handles: PlayerHandles);

    fn on_logout(&mut self, player: PlayerId);

    fn on_ghost_released(&mut self, host: &mut H, player: PlayerId);

    fn on_world_tick(&mut self, host: &mut H, delta_ms: u32) -> TickReport;
}

#[derive(Debug)]
pub struct Autopilot {
    config: AutopilotConfig,
    registry: SessionRegistry,
    timers: GlobalTimers,
    /// Oldest entries are dropped once [`EVENT_LOG_CAPACITY`] is reached.
    events: VecDeque<ControllerEvent>,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig) -> Self {
        Self {
            config,
            registry: SessionRegistry::new(),
            timers: GlobalTimers::new(),
            events: VecDeque::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn session(&self, player: PlayerId) -> Option<&SessionRecord> {
        self.registry.get(player)
    }

    pub fn timers(&self) -> GlobalTimers {
        self.timers
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.events.drain(..).collect()
    }

    fn record(&mut self, event: ControllerEvent) {
        if self.events.len() >= EVENT_LOG_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

impl<H: Host> LifecycleHooks<H> for Autopilot {
    fn on_login(&mut self, host: &mut H, player: PlayerId, handles: PlayerHandles) {
        if !self.config.enabled {
            return;
        }
        if !self.registry.register(player, handles) {
            return;
        }
        info!(?player, "autopilot session registered");
        host.send_system_message(player, &self.config.greeting);
        self.record(ControllerEvent::SessionRegistered { player_id: player });
    }

    fn on_logout(&mut self, player: PlayerId) {
        if self.registry.unregister(player) {
            info!(?player, "autopilot session removed");
            self.record(ControllerEvent::SessionRemoved { player_id: player });
        }
    }

    fn on_ghost_released(&mut self, host: &mut H, player: PlayerId) {
        if !self.config.enabled {
            return;
        }
        let Some(record) = self.registry.get_mut(player) else {
            return;
        };
        match locate_recovery_point(&*host, record.unit) {
            Ok(Some(point)) => {
                record.recovery_point = Some(point);
                self.record(ControllerEvent::RecoveryPointSet {
                    player_id: player,
                    point,
                });
            }
            Ok(None) => warn!(?player, "no graveyard found for released ghost"),
            Err(error) => warn!(?player, %error, "released ghost could not be resolved"),
        }
    }

    fn on_world_tick(&mut self, host: &mut H, delta_ms: u32) -> TickReport {
        if !self.config.enabled {
            return TickReport::default();
        }
        let mut events = Vec::new();
        let report = scheduler::tick(
            &mut self.timers,
            &mut self.registry,
            &self.config,
            host,
            delta_ms,
            &mut events,
        );
        for event in events {
            self.record(event);
        }
        report
    }
}

/// Autopilot behind one coarse lock, for hosts that deliver notifications
/// from more than one thread. Every hook holds the lock for its whole body,
/// so a logout can never interleave with a tick in progress.
#[derive(Clone, Debug)]
pub struct SharedAutopilot {
    inner: Arc<Mutex<Autopilot>>,
}

impl SharedAutopilot {
    pub fn new(autopilot: Autopilot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(autopilot)),
        }
    }

    /// Runs `f` with exclusive access to the autopilot.
    pub fn with<R>(&self, f: impl FnOnce(&mut Autopilot) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<H: Host> LifecycleHooks<H> for SharedAutopilot {
    fn on_login(&mut self, host: &mut H, player: PlayerId, handles: PlayerHandles) {
        self.with(|autopilot| autopilot.on_login(host, player, handles));
    }

    fn on_logout(&mut self, player: PlayerId) {
        self.with(|autopilot| LifecycleHooks::<H>::on_logout(autopilot, player));
    }

    fn on_ghost_released(&mut self, host: &mut H, player: PlayerId) {
        self.with(|autopilot| autopilot.on_ghost_released(host, player));
    }

    fn on_world_tick(&mut self, host: &mut H, delta_ms: u32) -> TickReport {
        self.with(|autopilot| autopilot.on_world_tick(host, delta_ms))
    }
}
