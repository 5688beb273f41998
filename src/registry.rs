use std::collections::BTreeMap;

use crate::outbound::OutboundCache;
use crate::types::{LifeState, MovementId, PlayerHandles, PlayerId, Position, UnitId};

/// Control record for one logged-in player.
#[derive(Clone, Debug)]
pub struct SessionRecord {
    pub player_id: PlayerId,
    pub unit: UnitId,
    pub movement: MovementId,
    pub target: Option<UnitId>,
    pub outbound: OutboundCache,
    pub recovery_point: Option<Position>,
    pub last_life: LifeState,
}

impl SessionRecord {
    fn new(player_id: PlayerId, handles: PlayerHandles) -> Self {
        Self {
            player_id,
            unit: handles.unit,
            movement: handles.movement,
            target: None,
            outbound: OutboundCache::default(),
            recovery_point: None,
            last_life: LifeState::Alive,
        }
    }

    /// Drops the cached target, returning it if one was set.
    pub fn clear_target(&mut self) -> Option<UnitId> {
        self.target.take()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<PlayerId, SessionRecord>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false and leaves the existing record untouched when the player
    /// is already registered.
    pub fn register(&mut self, player_id: PlayerId, handles: PlayerHandles) -> bool {
        if self.sessions.contains_key(&player_id) {
            return false;
        }
        self.sessions
            .insert(player_id, SessionRecord::new(player_id, handles));
        true
    }

    /// Removes the record and everything it owns, including any queued
    /// outbound descriptors.
    pub fn unregister(&mut self, player_id: PlayerId) -> bool {
        self.sessions.remove(&player_id).is_some()
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&SessionRecord> {
        self.sessions.get(&player_id)
    }

    pub fn get_mut(&mut self, player_id: PlayerId) -> Option<&mut SessionRecord> {
        self.sessions.get_mut(&player_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.sessions.keys().copied().collect()
    }

    /// Visits every record in ascending player-id order. The key set is
    /// snapshotted first; a record gone by the time it is reached is skipped.
    pub fn for_each(&mut self, mut visitor: impl FnMut(&mut SessionRecord)) {
        for player_id in self.player_ids() {
            if let Some(record) = self.sessions.get_mut(&player_id) {
                visitor(record);
            }
        }
    }
}
