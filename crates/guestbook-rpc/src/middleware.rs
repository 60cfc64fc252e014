// crates/guestbook-rpc/src/middleware.rs
//
// Middleware for the RPC server: the auth interceptor that resolves a bearer
// token into a `CallerContext`, the access gate applied by the router, and
// the config-driven token authenticator.
//
// The interceptor never rejects a request. It only records who the caller
// is; whether that is enough is decided per procedure by `authorize`.

use std::collections::HashMap;
use std::sync::Arc;

use tonic::{Request, Status};

use guestbook_core::{token_digest, Authenticator, CallerContext, CallerIdentity};

use crate::envelope::RpcError;

/// Access level of a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Callable by anyone.
    Public,
    /// Callable only by an authenticated caller.
    Protected,
}

/// Access gate: check a caller against a procedure's access level.
///
/// Returns the caller's identity for protected procedures so handlers can
/// attribute the call.
pub fn authorize<'a>(
    access: Access,
    caller: &'a CallerContext,
) -> Result<Option<&'a CallerIdentity>, RpcError> {
    match (access, caller.identity()) {
        (Access::Public, identity) => Ok(identity),
        (Access::Protected, Some(identity)) => Ok(Some(identity)),
        (Access::Protected, None) => Err(RpcError::unauthorized()),
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve the caller context from an optional `authorization` header value.
pub fn resolve_caller(authenticator: &dyn Authenticator, header: Option<&str>) -> CallerContext {
    header
        .and_then(bearer_token)
        .and_then(|token| authenticator.authenticate(token))
        .map(CallerContext::Authenticated)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// AuthInterceptor
// ---------------------------------------------------------------------------

/// Tonic interceptor that logs each request and attaches a `CallerContext`
/// to the request extensions.
#[derive(Clone)]
pub struct AuthInterceptor {
    authenticator: Arc<dyn Authenticator>,
}

impl AuthInterceptor {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl std::fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInterceptor").finish()
    }
}

impl tonic::service::Interceptor for AuthInterceptor {
    fn call(&mut self, mut req: Request<()>) -> Result<Request<()>, Status> {
        let header = req
            .metadata()
            .get("authorization")
            .and_then(|value| value.to_str().ok());
        let caller = resolve_caller(self.authenticator.as_ref(), header);

        // Never log the metadata itself: it carries the bearer token.
        tracing::info!(
            "Incoming RPC request (caller: {})",
            caller
                .identity()
                .map(|identity| identity.subject.as_str())
                .unwrap_or("anonymous")
        );

        req.extensions_mut().insert(caller);
        Ok(req)
    }
}

// ---------------------------------------------------------------------------
// StaticTokenAuthenticator
// ---------------------------------------------------------------------------

/// Authenticator backed by a fixed table of SHA-256 token digests.
///
/// Raw tokens are never held; a presented token is hashed and looked up.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    /// Map from lowercase hex digest to the identity it grants.
    tokens: HashMap<String, CallerIdentity>,
}

impl StaticTokenAuthenticator {
    /// Build from `(subject, token_sha256_hex)` pairs.
    pub fn new<I, S, D>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|(subject, digest)| {
                (
                    digest.as_ref().trim().to_ascii_lowercase(),
                    CallerIdentity::new(subject),
                )
            })
            .collect();
        Self { tokens }
    }

    /// Number of configured tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Option<CallerIdentity> {
        self.tokens.get(&token_digest(token)).cloned()
    }
}
