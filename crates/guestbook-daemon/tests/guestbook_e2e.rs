// crates/guestbook-daemon/tests/guestbook_e2e.rs
//
// End-to-end tests for the Guestbook service.
//
// These wire the router to each real store backend and, in the last test,
// run the tonic server and talk to it over HTTP/1.1 with reqwest. The daemon
// is a binary crate with no lib.rs, so everything goes through the public
// APIs of the library crates.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use uuid::Uuid;

use guestbook_core::{token_digest, CallerContext, CallerIdentity, EntryStore};
use guestbook_rpc::{
    GuestbookRouter, GuestbookRpcServer, JsonRpcRequest, JsonRpcResponse, RpcConfig,
    RpcErrorKind, StaticTokenAuthenticator, SERVICE_NAME,
};
use guestbook_store::{InMemoryEntryStore, RocksEntryStore, SqliteEntryStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a temporary path using UUID to avoid conflicts.
fn temp_path(label: &str) -> String {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("guestbook_e2e_{}_{}", label, Uuid::now_v7()));
    path.to_string_lossy().to_string()
}

fn ada() -> CallerContext {
    CallerContext::Authenticated(CallerIdentity::new("ada"))
}

async fn submit(router: &GuestbookRouter, name: &str, message: &str) -> JsonRpcResponse {
    router
        .dispatch(
            &ada(),
            JsonRpcRequest::new("guestbook/submitEntry", json!({"name": name, "message": message})),
        )
        .await
}

async fn list(router: &GuestbookRouter) -> Value {
    let resp = router
        .dispatch(
            &CallerContext::Anonymous,
            JsonRpcRequest::new("guestbook/listEntries", Value::Null),
        )
        .await;
    assert!(resp.success, "list failed: {:?}", resp.error);
    resp.result.unwrap_or(Value::Null)
}

/// Run the documented scenario plus the ordering property against a store.
async fn exercise_store(store: Arc<dyn EntryStore>) {
    let router = GuestbookRouter::new(store);

    assert_eq!(list(&router).await, json!({"entries": []}));

    assert!(submit(&router, "Ada", "hello").await.success);
    assert!(submit(&router, "Grace", "hi").await.success);
    assert_eq!(
        list(&router).await,
        json!({"entries": [
            {"name": "Grace", "message": "hi"},
            {"name": "Ada", "message": "hello"},
        ]})
    );

    for i in 0..10 {
        assert!(submit(&router, &format!("guest{}", i), "same message").await.success);
    }
    let listed = list(&router).await;
    let entries = listed["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 12);
    assert_eq!(entries[0], json!({"name": "guest9", "message": "same message"}));
    assert_eq!(entries[9], json!({"name": "guest0", "message": "same message"}));
    assert_eq!(entries[11], json!({"name": "Ada", "message": "hello"}));

    // No intervening writes: identical reads.
    assert_eq!(list(&router).await, listed);
}

// ===========================================================================
// Store backends
// ===========================================================================

#[tokio::test]
async fn test_scenario_in_memory() {
    exercise_store(Arc::new(InMemoryEntryStore::new())).await;
}

#[tokio::test]
async fn test_scenario_rocksdb() {
    let path = temp_path("rocks");
    exercise_store(Arc::new(RocksEntryStore::open(&path).unwrap())).await;
    let _ = std::fs::remove_dir_all(&path);
}

#[tokio::test]
async fn test_scenario_sqlite() {
    let path = temp_path("sqlite");
    exercise_store(Arc::new(SqliteEntryStore::open(&path).unwrap())).await;
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_rejected_submissions_leave_store_untouched() {
    let store = Arc::new(InMemoryEntryStore::new());
    let router = GuestbookRouter::new(store.clone());

    let resp = router
        .dispatch(
            &CallerContext::Anonymous,
            JsonRpcRequest::new("guestbook/submitEntry", json!({"name": "Ada", "message": "hi"})),
        )
        .await;
    assert_eq!(resp.error.unwrap().kind, RpcErrorKind::Unauthorized);

    let resp = router
        .dispatch(
            &ada(),
            JsonRpcRequest::new("guestbook/submitEntry", json!({"name": "Ada"})),
        )
        .await;
    let err = resp.error.unwrap();
    assert_eq!(err.kind, RpcErrorKind::ValidationError);
    assert_eq!(err.issues[0].path, "message");

    assert!(store.is_empty());
    assert_eq!(list(&router).await, json!({"entries": []}));
}

// ===========================================================================
// HTTP round trip
// ===========================================================================

/// Reserve a free local port.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn post(
    client: &reqwest::Client,
    url: &str,
    token: Option<&str>,
    body: Value,
) -> reqwest::Result<JsonRpcResponse> {
    let mut req = client.post(url).json(&body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    req.send().await?.json().await
}

#[tokio::test]
async fn test_http_round_trip() {
    let port = free_port();
    let store = Arc::new(InMemoryEntryStore::new());
    let authenticator = StaticTokenAuthenticator::new([("ada", token_digest("ada-token"))]);
    let server = GuestbookRpcServer::new(
        RpcConfig {
            host: "127.0.0.1".to_string(),
            port,
        },
        GuestbookRouter::new(store.clone()),
        Arc::new(authenticator),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server
            .start_with_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .map_err(|e| e.to_string())
    });

    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/{}/Call", port, SERVICE_NAME);
    let list_body = json!({"method": "guestbook/listEntries"});

    // Wait for the listener to come up.
    let mut first = None;
    for _ in 0..50 {
        match post(&client, &url, None, list_body.clone()).await {
            Ok(resp) => {
                first = Some(resp);
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
    let first = first.expect("server did not come up");
    assert!(first.success);
    assert_eq!(first.result, Some(json!({"entries": []})));

    let submit_body = json!({
        "method": "guestbook/submitEntry",
        "params": {"name": "Ada", "message": "hello"},
    });

    let resp = post(&client, &url, None, submit_body.clone()).await.unwrap();
    assert_eq!(resp.error.unwrap().kind, RpcErrorKind::Unauthorized);

    let resp = post(&client, &url, Some("wrong-token"), submit_body.clone()).await.unwrap();
    assert_eq!(resp.error.unwrap().kind, RpcErrorKind::Unauthorized);
    assert!(store.is_empty());

    let resp = post(&client, &url, Some("ada-token"), submit_body).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.result, Some(Value::Null));

    let resp = post(&client, &url, None, list_body).await.unwrap();
    assert_eq!(
        resp.result,
        Some(json!({"entries": [{"name": "Ada", "message": "hello"}]}))
    );

    let resp = client
        .post(&url)
        .body("not json")
        .send()
        .await
        .unwrap()
        .json::<JsonRpcResponse>()
        .await
        .unwrap();
    assert_eq!(resp.error.unwrap().kind, RpcErrorKind::InvalidRequest);

    let _ = shutdown_tx.send(());
    handle.await.unwrap().unwrap();
}
