//! Command-line flags.
//!
//! Every flag is optional; a flag that is given overrides the matching
//! environment variable and default (see [`Config::load`](super::Config::load)).

use std::path::PathBuf;

use clap::Parser;

use super::config::{ReadConcernLevel, ReadPreferenceMode, WriteConcernLevel};
use super::transport::TransportKind;

/// MCP server for MongoDB schema discovery, queries, updates and React-Admin generation.
#[derive(Debug, Default, Parser)]
#[command(name = "mongo-admin-mcp", version, about)]
pub struct Cli {
    /// MongoDB connection string [env: MDB_DB_URI]
    #[arg(long)]
    pub uri: Option<String>,

    /// Target database name [env: MDB_DB_NAME]
    #[arg(long)]
    pub name: Option<String>,

    /// Reject write tools (`--read-only` or `--read-only=false`) [env: MDB_DB_READONLY]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub read_only: Option<bool>,

    /// Connection and operation timeout in milliseconds [env: MDB_DB_TIMEOUT_MS]
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Read concern: local, available, majority, linearizable, snapshot
    #[arg(long)]
    pub read_concern: Option<ReadConcernLevel>,

    /// Read preference: primary, primaryPreferred, secondary, secondaryPreferred, nearest
    #[arg(long)]
    pub read_preference: Option<ReadPreferenceMode>,

    /// Write concern: "majority" or a node count
    #[arg(long)]
    pub write_concern: Option<WriteConcernLevel>,

    /// Server name reported to clients [env: MCP_SERVER_NAME]
    #[arg(long)]
    pub server_name: Option<String>,

    /// Log level: trace, debug, info, warn, error [env: MCP_LOG_LEVEL]
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also write logs to the platform log directory [env: MCP_LOG_TO_FILE]
    #[arg(long)]
    pub log_to_file: bool,

    /// Write logs to this directory [env: MCP_LOG_PATH]
    #[arg(long)]
    pub log_path: Option<PathBuf>,

    /// Transport: stdio, tcp, http [env: MCP_TRANSPORT]
    #[arg(long)]
    pub transport: Option<TransportKind>,

    /// Bind host for tcp/http transports
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port for tcp/http transports
    #[arg(long)]
    pub port: Option<u16>,
}
