//! Bidirectional message correlation.
//!
//! Every relayed message produces a pair `(original, mirror)` stored as two
//! directed entries so either side resolves to its peer in O(1). The map is
//! memory-resident for the life of the process and never evicts: after a
//! restart, edits and deletes of older messages simply stop propagating.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use mirror_channels::MessageId;

use crate::error::{Error, Result};

/// Symmetric `MessageId <-> MessageId` map.
///
/// A plain `std::sync::Mutex` is enough: every operation is a couple of
/// hash-map lookups and the guard is never held across an `.await`. Both
/// directions of a pair are written and removed under the same guard, so
/// concurrent handlers can never observe half a pair.
#[derive(Debug, Default)]
pub struct CorrelationStore {
    entries: Mutex<HashMap<MessageId, MessageId>>,
}

impl CorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MessageId, MessageId>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record that `a` and `b` mirror each other.
    ///
    /// Rejects the pair when either id is already a key (each message is
    /// relayed to exactly one mirror); the existing pair is left untouched.
    pub fn put(&self, a: MessageId, b: MessageId) -> Result<()> {
        let mut entries = self.lock();
        for id in [a, b] {
            if let Some(existing) = entries.get(&id) {
                return Err(Error::AlreadyCorrelated {
                    id,
                    existing: *existing,
                });
            }
        }
        entries.insert(a, b);
        entries.insert(b, a);
        Ok(())
    }

    pub fn get(&self, id: MessageId) -> Option<MessageId> {
        self.lock().get(&id).copied()
    }

    /// Remove the pair containing `id`, returning the peer that was removed.
    pub fn remove_pair(&self, id: MessageId) -> Option<MessageId> {
        let mut entries = self.lock();
        let peer = entries.remove(&id)?;
        entries.remove(&peer);
        Some(peer)
    }

    /// Number of correlated pairs.
    pub fn len(&self) -> usize {
        self.lock().len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
