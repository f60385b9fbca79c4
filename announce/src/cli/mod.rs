//! CLI module for announce
//!
//! Provides the registry server and a client for every action.

pub mod client;
pub mod serve;

use clap::{Parser, Subcommand};

/// Ephemeral announce registry - short-lived address board for peers
#[derive(Parser, Debug)]
#[command(name = "announce")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    ANNOUNCE_HOST           Bind address (default: 0.0.0.0)
    ANNOUNCE_PORT           Listen port (default: 8080)
    ANNOUNCE_LOG_LEVEL      Log level (default: info)
    ANNOUNCE_LOG_DIR        Also write daily rolling log files here
    ANNOUNCE_DATABASE_URL   Database URL (default: sqlite:data/announce.db)
    ANNOUNCE_TTL_SECS       Entry lifetime in seconds (default: 60)
    ANNOUNCE_PROTOCOL       Protocol version: v1 | v2 (default: v2)
    ANNOUNCE_TRUST_MODE     Declared address trust: declared | verified (default: declared)
    ANNOUNCE_MAX_INFO_LEN   Maximum info length for v1 (default: 255)
    ANNOUNCE_SERVER         Server base URL for the client subcommand
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the registry server
    Serve(serve::ServeArgs),
    /// Talk to a running registry server
    Client(client::ClientArgs),
}
