// crates/guestbook-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs the envelope to the daemon.

use guestbook_rpc::{JsonRpcRequest, JsonRpcResponse, SERVICE_NAME};

/// Connection settings shared by every command.
#[derive(Debug, Clone)]
pub struct RpcClient {
    endpoint: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RpcClient {
    pub fn new(endpoint: &str, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    /// URL of the single `Call` method.
    pub fn call_url(&self) -> String {
        format!("{}/{}/Call", self.endpoint, SERVICE_NAME)
    }

    /// Send a JSON-RPC call to the daemon and return the parsed response.
    pub async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<JsonRpcResponse, Box<dyn std::error::Error>> {
        let request = JsonRpcRequest::new(method, params);

        let mut builder = self.client.post(self.call_url()).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await?;
        let rpc_response: JsonRpcResponse = resp.json().await?;
        Ok(rpc_response)
    }

    /// Like `call`, but turns an error envelope into `Err`.
    pub async fn call_ok(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let response = self.call(method, params).await?;
        match response.error {
            Some(err) if !response.success => Err(Box::new(err)),
            _ => Ok(response.result.unwrap_or(serde_json::Value::Null)),
        }
    }
}
