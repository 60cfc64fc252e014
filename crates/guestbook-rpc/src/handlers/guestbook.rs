// crates/guestbook-rpc/src/handlers/guestbook.rs
//
// Guestbook handlers: ListEntries (public) and SubmitEntry (protected).
//
// By the time these run, the router has already enforced the access level
// and the input schema. Store failures are logged here and returned; the
// router decides whether the caller sees them.

use serde::{Deserialize, Serialize};

use guestbook_core::schema::{FieldSpec, FieldType, InputSchema};
use guestbook_core::{CallerIdentity, EntryOrder, EntryStore, EntryView, GuestbookError, NewEntry};

// ---------------------------------------------------------------------------
// ListEntries
// ---------------------------------------------------------------------------

/// Request to list all guestbook entries. Takes no parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEntriesRequest {}

/// Response containing entries projected to `{name, message}`, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntriesResponse {
    pub entries: Vec<EntryView>,
}

/// Handle a ListEntries request.
pub async fn handle_list_entries(
    store: &dyn EntryStore,
    _request: ListEntriesRequest,
) -> Result<ListEntriesResponse, GuestbookError> {
    let entries = store
        .list_entries(EntryOrder::NewestFirst)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list guestbook entries: {}", e);
            e
        })?;

    Ok(ListEntriesResponse {
        entries: entries.into_iter().map(EntryView::from).collect(),
    })
}

// ---------------------------------------------------------------------------
// SubmitEntry
// ---------------------------------------------------------------------------

/// Input schema for `guestbook/submitEntry`: both fields required strings.
pub const SUBMIT_ENTRY_SCHEMA: InputSchema = InputSchema::object(&[
    FieldSpec::required("name", FieldType::String),
    FieldSpec::required("message", FieldType::String),
]);

/// Request to add a new guestbook entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitEntryRequest {
    /// Display name of the author.
    pub name: String,
    /// Message body.
    pub message: String,
}

/// Handle a SubmitEntry request. Returns no payload.
pub async fn handle_submit_entry(
    store: &dyn EntryStore,
    caller: &CallerIdentity,
    request: SubmitEntryRequest,
) -> Result<(), GuestbookError> {
    let entry = store
        .insert_entry(NewEntry::new(request.name, request.message))
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert guestbook entry for {}: {}", caller.subject, e);
            e
        })?;

    tracing::debug!("Guestbook entry {} submitted by {}", entry.id, caller.subject);
    Ok(())
}
