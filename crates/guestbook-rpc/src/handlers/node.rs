// crates/guestbook-rpc/src/handlers/node.rs
//
// Node health handler: GetHealth.

use serde::{Deserialize, Serialize};

use guestbook_core::{EntryOrder, EntryStore, GuestbookError};

/// Request for node health status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetHealthRequest {}

/// Response containing node health status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetHealthResponse {
    /// Overall health: "healthy" or "degraded".
    pub status: String,
    /// Configured store backend (e.g., "rocksdb", "sqlite", "memory").
    pub storage_backend: String,
    /// Whether a store read succeeded.
    pub storage_ok: bool,
    /// Number of stored entries, if the store could be read.
    pub entry_count: Option<usize>,
    /// Software version.
    pub version: String,
}

/// Handle a GetHealth request.
///
/// Probes the store with a full listing; a failed read reports "degraded"
/// rather than an error so the endpoint stays usable while the store is down.
pub async fn handle_get_health(
    store: &dyn EntryStore,
    _request: GetHealthRequest,
) -> Result<GetHealthResponse, GuestbookError> {
    let entry_count = match store.list_entries(EntryOrder::NewestFirst).await {
        Ok(entries) => Some(entries.len()),
        Err(e) => {
            tracing::warn!("Health probe could not read the store: {}", e);
            None
        }
    };
    let storage_ok = entry_count.is_some();

    Ok(GetHealthResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        storage_backend: store.backend_name().to_string(),
        storage_ok,
        entry_count,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
