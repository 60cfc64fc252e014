// crates/guestbook-daemon/src/backend.rs
//
// Open the configured entry store.

use std::sync::Arc;

use guestbook_core::EntryStore;
use guestbook_store::{InMemoryEntryStore, RocksEntryStore, SqliteEntryStore};

use crate::config::StorageBackend;

/// Open the store for `backend` under `data_dir`, creating the directory
/// if needed.
pub fn open_store(
    backend: StorageBackend,
    data_dir: &str,
) -> Result<Arc<dyn EntryStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn EntryStore> = match backend {
        StorageBackend::Rocksdb => {
            std::fs::create_dir_all(data_dir)?;
            let path = format!("{}/rocksdb", data_dir);
            tracing::info!("Opening RocksDB entry store at {}", path);
            Arc::new(RocksEntryStore::open(&path)?)
        }
        StorageBackend::Sqlite => {
            std::fs::create_dir_all(data_dir)?;
            let path = format!("{}/guestbook.sqlite", data_dir);
            tracing::info!("Opening SQLite entry store at {}", path);
            Arc::new(SqliteEntryStore::open(&path)?)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory entry store; entries are lost on shutdown");
            Arc::new(InMemoryEntryStore::new())
        }
    };
    Ok(store)
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
