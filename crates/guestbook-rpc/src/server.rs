// crates/guestbook-rpc/src/server.rs
//
// RPC server setup: GuestbookRpcServer and RpcConfig.
//
// Uses a JSON-RPC-over-gRPC approach. A single tonic unary service accepts
// JSON-encoded requests with a method field, hands them to the
// GuestbookRouter, and returns JSON-encoded responses. HTTP/1.1 is accepted,
// so a browser or `reqwest` can POST the envelope directly to
// `/guestbook.rpc.GuestbookService/Call`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Server;
use tonic::Status;

use guestbook_core::{Authenticator, CallerContext};

use crate::envelope::{JsonRpcRequest, JsonRpcResponse, RpcError};
use crate::middleware::AuthInterceptor;
use crate::router::GuestbookRouter;

/// Fully-qualified tonic service name; also the URL path prefix.
pub const SERVICE_NAME: &str = "guestbook.rpc.GuestbookService";

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

impl RpcConfig {
    /// Parse `host:port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

// ---------------------------------------------------------------------------
// GuestbookRpcServer
// ---------------------------------------------------------------------------

/// The main RPC server for the Guestbook service.
///
/// Holds the router (and through it the store) plus the authenticator used
/// by the interceptor.
#[derive(Clone)]
pub struct GuestbookRpcServer {
    config: RpcConfig,
    router: GuestbookRouter,
    authenticator: Arc<dyn Authenticator>,
}

impl std::fmt::Debug for GuestbookRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestbookRpcServer")
            .field("config", &self.config)
            .field("router", &self.router)
            .finish()
    }
}

impl GuestbookRpcServer {
    /// Create a new GuestbookRpcServer.
    ///
    /// # Arguments
    /// * `config` - Server configuration (host, port).
    /// * `router` - Router wrapping the shared entry store.
    /// * `authenticator` - Resolves bearer tokens for protected procedures.
    pub fn new(
        config: RpcConfig,
        router: GuestbookRouter,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config,
            router,
            authenticator,
        }
    }

    /// The tonic service, wrapped in the auth interceptor.
    pub fn service(&self) -> InterceptedService<GuestbookJsonRpcServer, AuthInterceptor> {
        InterceptedService::new(
            GuestbookJsonRpcServer::new(self.router.clone()),
            AuthInterceptor::new(self.authenticator.clone()),
        )
    }

    /// Start the RPC server and serve requests until `signal` resolves.
    pub async fn start_with_shutdown<F>(&self, signal: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send,
    {
        let addr = self.config.socket_addr()?;

        tracing::info!("Guestbook RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(self.service())
            .serve_with_shutdown(addr, signal)
            .await?;

        tracing::info!("Guestbook RPC server stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// A single gRPC service with one method: `Call`.
// The request and response bodies are raw JSON (JsonRpcRequest/Response),
// so no proto codegen is needed.

/// The tonic service wrapper. Implements the low-level gRPC service
/// by accepting bytes, deserializing as JSON-RPC, and dispatching.
#[derive(Clone)]
pub struct GuestbookJsonRpcServer {
    router: GuestbookRouter,
}

impl std::fmt::Debug for GuestbookJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestbookJsonRpcServer").finish()
    }
}

impl GuestbookJsonRpcServer {
    fn new(router: GuestbookRouter) -> Self {
        Self { router }
    }
}

impl tonic::server::NamedService for GuestbookJsonRpcServer {
    const NAME: &'static str = SERVICE_NAME;
}

impl<B> tower_service::Service<http::Request<B>> for GuestbookJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let router = self.router.clone();

        Box::pin(async move {
            // Set by AuthInterceptor; a request that bypassed it is anonymous.
            let caller = req
                .extensions()
                .get::<CallerContext>()
                .cloned()
                .unwrap_or_default();

            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp = JsonRpcResponse::err(RpcError::invalid_request(format!(
                        "Failed to read request body: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::err(RpcError::invalid_request(format!(
                        "Invalid JSON-RPC request: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_response = router.dispatch(&caller, rpc_request).await;
            Ok(build_response(&rpc_response))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<bytes::Bytes, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    body.collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| {
            let e: Box<dyn std::error::Error + Send + Sync> = e.into();
            e.to_string()
        })
}

/// Build an HTTP response carrying the JSON-encoded envelope.
fn build_response(envelope: &JsonRpcResponse) -> http::Response<tonic::body::BoxBody> {
    let json = serde_json::to_vec(envelope).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize RPC response: {}", e);
        br#"{"success":false,"result":null,"error":{"kind":"internal","message":"response encoding failed"}}"#
            .to_vec()
    });

    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}
