use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serenity::all::MessageId;

use super::{GiveawayRecord, GiveawayStatus};

/// Open giveaways, keyed by announcement message id.
///
/// Owned by the bot state and handed to handlers by reference. Every
/// mutation of one record runs under that key's shard lock, so concurrent
/// interactions for the same giveaway are serialised. Closed giveaways are
/// removed; there is no history.
#[derive(Debug, Default)]
pub struct GiveawayRegistry {
    open: DashMap<MessageId, GiveawayRecord>,
}

impl GiveawayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an open record. A second record for an id that is already
    /// open is dropped and the existing one kept.
    pub fn create(&self, mut record: GiveawayRecord) -> MessageId {
        let id = record.id;
        record.status = GiveawayStatus::Open;
        match self.open.entry(id) {
            Entry::Vacant(v) => {
                v.insert(record);
            }
            Entry::Occupied(_) => {
                tracing::warn!(giveaway_id = %id, "giveaway already open, keeping existing record");
            }
        }
        id
    }

    /// Snapshot of the current record. Re-fetch after any I/O instead of
    /// holding on to it.
    pub fn get(&self, id: MessageId) -> Option<GiveawayRecord> {
        self.open.get(&id).map(|r| r.value().clone())
    }

    /// Removes the record and hands it back marked closed. Only one caller
    /// ever gets `Some` for a given id.
    pub fn delete(&self, id: MessageId) -> Option<GiveawayRecord> {
        self.open.remove(&id).map(|(_, mut record)| {
            record.status = GiveawayStatus::Closed;
            record
        })
    }

    /// Snapshots of every open giveaway, soonest ending first.
    pub fn open_giveaways(&self) -> Vec<GiveawayRecord> {
        let mut all: Vec<GiveawayRecord> = self.open.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|g| (g.ends_at, g.id));
        all
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Runs `f` on the open record under its lock. `None` if absent.
    pub(crate) fn with_open_mut<R>(&self, id: MessageId, f: impl FnOnce(&mut GiveawayRecord) -> R) -> Option<R> {
        self.open.get_mut(&id).map(|mut r| f(r.value_mut()))
    }
}
