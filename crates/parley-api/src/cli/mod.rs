//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. Every command operates on the
//! message file in the data directory, the same one `parley serve` uses.
//! Writes are only serialized within one process, so mutating commands must
//! not run while a server owns the same data directory.

pub mod message;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use parley_observe::tracing_setup::LogFormat;

/// Shown under `--help`.
const DATA_DIR_NOTE: &str = "Do not run send, edit, delete or clear against a data directory \
that a running `parley serve` uses; post through the REST API instead.";

/// A small chat log with a rule-based bot.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = DATA_DIR_NOTE)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress confirmations and progress output.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format (pretty or json).
    #[arg(long, global = true, default_value = "pretty", env = "PARLEY_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Data directory holding `messages.json` and `config.toml`.
    #[arg(long, global = true, env = "PARLEY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000", env = "PORT")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// List all messages.
    #[command(alias = "ls")]
    List,

    /// Show a single message.
    Show {
        /// Message id.
        id: u64,
    },

    /// Post a message and wait for the bot to answer.
    Send {
        /// Message text.
        text: String,

        /// Display name of the author.
        #[arg(short, long)]
        sender: Option<String>,

        /// Return right after storing the message. The pending reply is
        /// discarded when the process exits.
        #[arg(long)]
        no_wait: bool,
    },

    /// Replace the text of a message.
    Edit {
        /// Message id.
        id: u64,
        /// New text.
        text: String,
    },

    /// Delete a message.
    #[command(alias = "rm")]
    Delete {
        /// Message id.
        id: u64,
    },

    /// Delete every message.
    Clear {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Show what the bot would answer, without storing anything.
    Reply {
        /// Message text.
        text: String,

        /// Display name used in the answer.
        #[arg(short, long)]
        sender: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
