// crates/guestbook-store/src/lib.rs
//
// guestbook-store: Storage backends for the Guestbook service.
//
// Provides a RocksDB-backed entry log, a SQLite table for deployments that
// want a relational store, and an in-memory store for tests and ephemeral
// runs. All three implement `guestbook_core::EntryStore`.

pub mod memory;
pub mod rocks;
pub mod sqlite;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::InMemoryEntryStore;
pub use rocks::RocksEntryStore;
pub use sqlite::SqliteEntryStore;
