// crates/guestbook-rpc/src/lib.rs
//
// guestbook-rpc: JSON-RPC server and handlers for the Guestbook service.
//
// Provides a tonic-based RPC server that carries a JSON envelope over a
// single unary method, an auth interceptor that resolves bearer tokens into
// a caller context, a router with a per-procedure access table and input
// schemas, and the `guestbook/*` and `node/*` handlers.

pub mod envelope;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

// Re-export the main server type for ergonomic access.
pub use envelope::{JsonRpcRequest, JsonRpcResponse, RpcError, RpcErrorKind};
pub use middleware::StaticTokenAuthenticator;
pub use router::{GuestbookRouter, StoreFailurePolicy};
pub use server::{GuestbookRpcServer, RpcConfig, SERVICE_NAME};
