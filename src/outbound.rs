use std::collections::{BTreeMap, BTreeSet};

use crate::types::{OutboundKind, OutboundMessage};

/// Per-session de-duplication of one-shot protocol requests.
///
/// `pending` holds the descriptors requested during the current tick and is
/// emptied at every tick start. `latched` remembers kinds already requested
/// in the current death cycle so a request is not repeated on later ticks
/// while the player stays in the same state.
#[derive(Clone, Debug, Default)]
pub struct OutboundCache {
    pending: BTreeMap<OutboundKind, OutboundMessage>,
    latched: BTreeSet<OutboundKind>,
}

impl OutboundCache {
    pub fn begin_tick(&mut self) {
        self.pending.clear();
    }

    /// Returns a descriptor to enqueue, or `None` when `kind` was already
    /// requested this tick or this cycle.
    pub fn request(&mut self, kind: OutboundKind) -> Option<OutboundMessage> {
        if self.pending.contains_key(&kind) || self.latched.contains(&kind) {
            return None;
        }
        let message = OutboundMessage::new(kind);
        self.pending.insert(kind, message.clone());
        self.latched.insert(kind);
        Some(message)
    }

    pub fn reset_cycle(&mut self) {
        self.latched.clear();
    }

    pub fn is_pending(&self, kind: OutboundKind) -> bool {
        self.pending.contains_key(&kind)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_latched(&self, kind: OutboundKind) -> bool {
        self.latched.contains(&kind)
    }
}
