//! Process-lifetime cache of snippet records seen during this run.

use parking_lot::RwLock;
use snip_core::SnippetEvent;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Records keyed by event id. Shared between operations through an `Arc`.
#[derive(Debug, Default)]
pub struct EventStore {
    events: RwLock<HashMap<String, SnippetEvent>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the record was not stored before. A known id keeps
    /// its first record.
    pub fn insert(&self, event: SnippetEvent) -> bool {
        match self.events.write().entry(event.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(event);
                true
            }
        }
    }

    /// Returns how many records were new.
    pub fn insert_all(&self, events: impl IntoIterator<Item = SnippetEvent>) -> usize {
        let mut guard = self.events.write();
        events
            .into_iter()
            .filter(|e| match guard.entry(e.id.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(e.clone());
                    true
                }
            })
            .count()
    }

    pub fn get(&self, id: &str) -> Option<SnippetEvent> {
        self.events.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.events.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}
