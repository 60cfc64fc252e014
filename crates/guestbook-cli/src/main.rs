// crates/guestbook-cli/src/main.rs
//
// CLI entrypoint for the Guestbook developer tools.
//
// Provides subcommands for listing and submitting entries, checking daemon
// health, and generating token digests for the daemon config.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use output::OutputFormat;
use rpc_client::RpcClient;

/// Guestbook CLI for talking to a running guestbookd.
#[derive(Parser, Debug)]
#[command(name = "guestbook", version, about = "Guestbook CLI")]
struct Cli {
    /// RPC endpoint for the guestbook daemon.
    #[arg(long, global = true, default_value = "http://localhost:50051")]
    rpc: String,

    /// Bearer token for protected commands (submit).
    #[arg(long, global = true)]
    token: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// List guestbook entries, newest first.
    List,

    /// Submit a new entry (requires --token).
    Submit {
        /// Author name.
        #[arg(long)]
        name: String,
        /// Message text.
        #[arg(long)]
        message: String,
    },

    /// Display daemon health and version info.
    Health,

    /// Print the SHA-256 digest of a token for the daemon's auth_tokens list.
    TokenDigest {
        /// The raw token.
        token: String,
        /// Emit a ready-to-paste [[auth_tokens]] block for this subject.
        #[arg(long)]
        subject: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    let client = RpcClient::new(&cli.rpc, cli.token.clone());

    match &cli.command {
        Commands::List => commands::entries::list(&client, format).await?,
        Commands::Submit { name, message } => {
            commands::entries::submit(&client, name, message).await?
        }
        Commands::Health => commands::status::run(&client, format).await?,
        Commands::TokenDigest { token, subject } => commands::token::run(token, subject.as_deref()),
    }

    Ok(())
}
