// crates/guestbook-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for a specific API group.

pub mod guestbook;
pub mod node;
