// crates/guestbook-store/src/memory.rs
//
// In-memory entry store.
//
// Keeps entries in insertion order behind a RwLock. Nothing survives a
// restart; used by tests and by the daemon's `memory` backend.

use std::sync::RwLock;

use async_trait::async_trait;

use guestbook_core::entry::next_created_at;
use guestbook_core::error::GuestbookError;
use guestbook_core::traits::EntryStore;
use guestbook_core::{EntryOrder, GuestbookEntry, NewEntry};

/// In-memory store implementing the `EntryStore` trait.
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: RwLock<Vec<GuestbookEntry>>,
}

impl InMemoryEntryStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Return true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn insert_entry(&self, entry: NewEntry) -> Result<GuestbookEntry, GuestbookError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| GuestbookError::Storage(format!("RwLock poisoned: {}", e)))?;
        let created_at = next_created_at(entries.last().map(|e| e.created_at));
        let entry = GuestbookEntry::from_new(entry, created_at);
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn list_entries(&self, order: EntryOrder) -> Result<Vec<GuestbookEntry>, GuestbookError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| GuestbookError::Storage(format!("RwLock poisoned: {}", e)))?;
        let listed = match order {
            EntryOrder::NewestFirst => entries.iter().rev().cloned().collect(),
            EntryOrder::OldestFirst => entries.clone(),
        };
        Ok(listed)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
