// crates/guestbook-core/src/lib.rs
//
// guestbook-core: Core types, traits, and input schema for the Guestbook service.
//
// This is the leaf crate that the rest of the workspace depends on.
// It defines the entry data model, the error type, the declarative input
// schema used at the RPC boundary, caller identity, and the trait interfaces
// for the store and authentication collaborators.

pub mod entry;
pub mod error;
pub mod identity;
pub mod schema;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use guestbook_core::GuestbookEntry;`

// Entry types
pub use entry::{EntryOrder, EntryView, GuestbookEntry, NewEntry};

// Identity types
pub use identity::{token_digest, CallerContext, CallerIdentity};

// Schema types
pub use schema::{FieldIssue, FieldSpec, FieldType, InputSchema};

// Error type
pub use error::GuestbookError;

// Traits
pub use traits::{Authenticator, EntryStore};
