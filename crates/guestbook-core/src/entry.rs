// crates/guestbook-core/src/entry.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single guestbook submission as persisted by the store.
///
/// `created_at` is assigned by the store at insertion time and never changes
/// afterwards. Entries are never updated or deleted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestbookEntry {
    /// Store-internal row identity (UUIDv7). Not exposed by the list operation.
    pub id: Uuid,
    /// Display name of the author.
    pub name: String,
    /// Message body.
    pub message: String,
    /// Insertion timestamp, assigned by the store.
    pub created_at: DateTime<Utc>,
}

impl GuestbookEntry {
    /// Materialize a new entry from an insert payload.
    ///
    /// Only store backends should call this: they own the clock.
    pub fn from_new(new_entry: NewEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: new_entry.name,
            message: new_entry.message,
            created_at,
        }
    }
}

/// Insert payload. Carries no timestamp, so callers cannot choose `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub name: String,
    pub message: String,
}

impl NewEntry {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// The `{name, message}` projection returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    pub name: String,
    pub message: String,
}

impl From<GuestbookEntry> for EntryView {
    fn from(entry: GuestbookEntry) -> Self {
        Self {
            name: entry.name,
            message: entry.message,
        }
    }
}

/// Ordering for `EntryStore::list_entries`, keyed on `created_at`.
///
/// Entries sharing a timestamp are ordered by insertion, so under
/// `NewestFirst` the most recently inserted entry always comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Next `created_at` for a store that has already handed out `last`.
///
/// Never moves backwards, so insertion order and timestamp order agree even
/// if the wall clock steps back between two inserts.
pub fn next_created_at(last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match last {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_view_drops_created_at() {
        let entry = GuestbookEntry::from_new(NewEntry::new("Ada", "hello"), Utc::now());
        let json = serde_json::to_value(EntryView::from(entry)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Ada", "message": "hello"}));
        assert!(json.get("created_at").is_none());
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_next_created_at_is_monotonic() {
        let future = Utc::now() + Duration::seconds(60);
        assert_eq!(next_created_at(Some(future)), future);

        let past = Utc::now() - Duration::seconds(60);
        assert!(next_created_at(Some(past)) > past);
        assert!(next_created_at(None) <= Utc::now());
    }

    #[test]
    fn test_default_order_is_newest_first() {
        assert_eq!(EntryOrder::default(), EntryOrder::NewestFirst);
    }
}
