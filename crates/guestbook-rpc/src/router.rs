// crates/guestbook-rpc/src/router.rs
//
// GuestbookRouter: the request pipeline shared by every procedure.
//
//   access gate -> input schema -> deserialize -> handler -> envelope
//
// Procedures are declared in a static table with their access level and
// optional input schema, so the gate and the schema run before any handler
// code and can be tested without a transport.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use guestbook_core::schema::{FieldIssue, InputSchema};
use guestbook_core::{CallerContext, EntryStore, GuestbookError};

use crate::envelope::{JsonRpcRequest, JsonRpcResponse, RpcError, RpcErrorKind};
use crate::handlers;
use crate::middleware::{self, Access};

pub const LIST_ENTRIES: &str = "guestbook/listEntries";
pub const SUBMIT_ENTRY: &str = "guestbook/submitEntry";
pub const NODE_HEALTH: &str = "node/health";

/// A registered procedure.
#[derive(Debug, Clone, Copy)]
pub struct Procedure {
    pub method: &'static str,
    pub access: Access,
    pub input: Option<InputSchema>,
}

/// Every procedure the router serves.
pub const PROCEDURES: &[Procedure] = &[
    Procedure {
        method: LIST_ENTRIES,
        access: Access::Public,
        input: None,
    },
    Procedure {
        method: SUBMIT_ENTRY,
        access: Access::Protected,
        input: Some(handlers::guestbook::SUBMIT_ENTRY_SCHEMA),
    },
    Procedure {
        method: NODE_HEALTH,
        access: Access::Public,
        input: None,
    },
];

/// Look up a procedure by wire method name.
pub fn procedure(method: &str) -> Option<&'static Procedure> {
    PROCEDURES.iter().find(|p| p.method == method)
}

/// What callers see when the store fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreFailurePolicy {
    /// Return a `store_failure` error.
    #[default]
    Propagate,
    /// Log the failure and answer with a success envelope and a `null` result.
    /// Callers cannot tell an empty or failed read from success.
    Swallow,
}

/// Routes JSON-RPC requests through the access gate and schema stage to the
/// handlers.
#[derive(Clone)]
pub struct GuestbookRouter {
    store: Arc<dyn EntryStore>,
    store_failure_policy: StoreFailurePolicy,
}

impl std::fmt::Debug for GuestbookRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestbookRouter")
            .field("store", &self.store.backend_name())
            .field("store_failure_policy", &self.store_failure_policy)
            .finish()
    }
}

impl GuestbookRouter {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self {
            store,
            store_failure_policy: StoreFailurePolicy::default(),
        }
    }

    /// Set how store failures are reported to callers.
    pub fn with_store_failure_policy(mut self, policy: StoreFailurePolicy) -> Self {
        self.store_failure_policy = policy;
        self
    }

    /// Dispatch a JSON-RPC request on behalf of `caller`.
    pub async fn dispatch(&self, caller: &CallerContext, request: JsonRpcRequest) -> JsonRpcResponse {
        let method = request.method.clone();
        match self.route(caller, request).await {
            Ok(value) => JsonRpcResponse::ok(value),
            Err(err) if err.kind == RpcErrorKind::StoreFailure
                && self.store_failure_policy == StoreFailurePolicy::Swallow =>
            {
                tracing::warn!("Swallowing store failure for {}: {}", method, err.message);
                JsonRpcResponse::ok(Value::Null)
            }
            Err(err) => {
                tracing::debug!("RPC {} failed: {}", method, err);
                JsonRpcResponse::err(err)
            }
        }
    }

    async fn route(&self, caller: &CallerContext, request: JsonRpcRequest) -> Result<Value, RpcError> {
        let procedure =
            procedure(&request.method).ok_or_else(|| RpcError::method_not_found(&request.method))?;

        let identity = middleware::authorize(procedure.access, caller)?;

        let params = normalize_params(request.params);
        if let Some(schema) = procedure.input {
            schema.validate(&params).map_err(RpcError::validation)?;
        }

        let store = self.store.as_ref();
        match procedure.method {
            LIST_ENTRIES => {
                dispatch_handler(params, |r| handlers::guestbook::handle_list_entries(store, r)).await
            }
            SUBMIT_ENTRY => {
                let identity = identity.ok_or_else(RpcError::unauthorized)?;
                dispatch_handler(params, |r| {
                    handlers::guestbook::handle_submit_entry(store, identity, r)
                })
                .await
            }
            NODE_HEALTH => {
                dispatch_handler(params, |r| handlers::node::handle_get_health(store, r)).await
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }
}

/// Procedures without input accept `null` params as an empty object.
fn normalize_params(params: Value) -> Value {
    match params {
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(params: Value, handler: F) -> Result<Value, RpcError>
where
    Req: serde::de::DeserializeOwned,
    Resp: Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, GuestbookError>>,
{
    let request: Req = serde_json::from_value(params).map_err(|e| {
        RpcError::validation(vec![FieldIssue {
            path: String::new(),
            expected: "object".to_string(),
            received: "invalid".to_string(),
            message: format!("Failed to deserialize request: {}", e),
        }])
    })?;
    let response = handler(request).await?;
    serde_json::to_value(response)
        .map_err(|e| RpcError::internal(format!("Failed to serialize response: {}", e)))
}
