// crates/guestbook-cli/src/commands/entries.rs
//
// `guestbook list` and `guestbook submit`.

use serde_json::{json, Value};

use guestbook_core::EntryView;
use guestbook_rpc::handlers::guestbook::ListEntriesResponse;

use crate::output::{self, EntryRow, OutputFormat};
use crate::rpc_client::RpcClient;

/// Run `guestbook list`: print entries, newest first.
pub async fn list(client: &RpcClient, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let result = client.call_ok("guestbook/listEntries", json!({})).await?;
    let response = parse_list_result(result)?;

    match format {
        OutputFormat::Json => println!("{}", output::format_json(&response.entries)),
        OutputFormat::Table => {
            if response.entries.is_empty() {
                println!("The guestbook is empty.");
                return Ok(());
            }
            let rows: Vec<EntryRow> = response
                .entries
                .into_iter()
                .map(|view: EntryView| EntryRow {
                    name: view.name,
                    message: output::truncate(&view.message, 80),
                })
                .collect();
            println!("{}", output::format_table(&rows));
        }
    }

    Ok(())
}

/// Decode a `guestbook/listEntries` result.
///
/// A daemon running with `store_failure_policy = "swallow"` answers a failed
/// listing with a `null` result instead of an error.
fn parse_list_result(result: Value) -> Result<ListEntriesResponse, Box<dyn std::error::Error>> {
    if result.is_null() {
        return Err("the daemon could not read its store (failure was swallowed; see daemon logs)".into());
    }
    Ok(serde_json::from_value(result)?)
}

/// Run `guestbook submit`: add an entry. Requires `--token`.
pub async fn submit(
    client: &RpcClient,
    name: &str,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    client
        .call_ok(
            "guestbook/submitEntry",
            json!({"name": name, "message": message}),
        )
        .await?;
    println!("Entry submitted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_result() {
        let response =
            parse_list_result(json!({"entries": [{"name": "Ada", "message": "hello"}]})).unwrap();
        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.entries[0].name, "Ada");
    }

    #[test]
    fn test_null_list_result_reports_swallowed_failure() {
        let err = parse_list_result(Value::Null).unwrap_err();
        assert!(err.to_string().contains("could not read its store"));
    }
}
