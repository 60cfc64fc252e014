// crates/guestbook-core/src/traits.rs

use async_trait::async_trait;

use crate::entry::{EntryOrder, GuestbookEntry, NewEntry};
use crate::error::GuestbookError;
use crate::identity::CallerIdentity;

/// Trait for persistent guestbook entry storage.
///
/// Implemented by guestbook-store (RocksDB, SQLite and in-memory backends).
/// Backends own `created_at` assignment and handle concurrent inserts.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert a new entry. The store assigns `id` and `created_at`.
    async fn insert_entry(&self, entry: NewEntry) -> Result<GuestbookEntry, GuestbookError>;

    /// Return every entry, ordered by `created_at` as requested.
    async fn list_entries(&self, order: EntryOrder) -> Result<Vec<GuestbookEntry>, GuestbookError>;

    /// Short backend name for health reporting (e.g. "rocksdb").
    fn backend_name(&self) -> &'static str;
}

/// Trait for resolving a bearer token to a caller identity.
///
/// Returns `None` for unknown or malformed tokens.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Option<CallerIdentity>;
}
