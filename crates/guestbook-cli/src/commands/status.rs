// crates/guestbook-cli/src/commands/status.rs
//
// `guestbook health`: display daemon health and version info.

use serde_json::json;

use guestbook_rpc::handlers::node::GetHealthResponse;

use crate::output::{self, OutputFormat};
use crate::rpc_client::RpcClient;

/// Run the health command.
pub async fn run(client: &RpcClient, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let result = client.call_ok("node/health", json!({})).await?;
    let health: GetHealthResponse = serde_json::from_value(result)?;

    if format == OutputFormat::Json {
        println!("{}", output::format_json(&health));
        return Ok(());
    }

    println!("Guestbook daemon v{}", health.version);
    println!();
    println!("  Endpoint: {}", client.call_url());
    println!("  Status:   {}", health.status);
    println!(
        "  Storage:  {} ({})",
        health.storage_backend,
        if health.storage_ok { "ok" } else { "unreachable" }
    );
    match health.entry_count {
        Some(count) => println!("  Entries:  {}", count),
        None => println!("  Entries:  unknown"),
    }

    Ok(())
}
