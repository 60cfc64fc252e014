// crates/guestbook-daemon/src/config.rs
//
// Runtime configuration for the Guestbook daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use guestbook_rpc::StoreFailurePolicy;

/// Which `EntryStore` backend the daemon opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Rocksdb,
    Sqlite,
    Memory,
}

/// A bearer token accepted for protected procedures.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthTokenConfig {
    /// Identity granted to holders of the token.
    pub subject: String,
    /// Hex SHA-256 of the token (`guestbook token-digest <token>`).
    pub token_sha256: String,
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Directory for local data storage (RocksDB or SQLite files).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Store backend: "rocksdb", "sqlite", or "memory".
    #[serde(default = "default_storage_backend")]
    pub storage_backend: StorageBackend,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "propagate" (default) returns store failures to callers;
    /// "swallow" logs them and answers with an empty success.
    #[serde(default)]
    pub store_failure_policy: StoreFailurePolicy,

    /// Tokens accepted for protected procedures. When empty, every
    /// protected call is rejected as unauthorized.
    #[serde(default)]
    pub auth_tokens: Vec<AuthTokenConfig>,
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50051
}

fn default_data_dir() -> String {
    "~/.guestbook/data".to_string()
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::Rocksdb
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            data_dir: default_data_dir(),
            storage_backend: default_storage_backend(),
            log_level: default_log_level(),
            store_failure_policy: StoreFailurePolicy::default(),
            auth_tokens: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }
}
