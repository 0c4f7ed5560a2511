//! Filesystem adapters for Parley.
//!
//! Provides the JSON-file `MessageLog` and helpers for the data directory
//! layout.

pub mod message_log;

use std::path::{Path, PathBuf};

pub use message_log::JsonFileMessageLog;

/// Compute the message document path: `{data_dir}/{file_name}`.
///
/// Absolute `file_name`s are used as-is.
pub fn messages_path(data_dir: &Path, file_name: &str) -> PathBuf {
    data_dir.join(file_name)
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PARLEY_DATA_DIR` environment variable
/// 2. `~/.parley` in the user's home directory
/// 3. `.parley` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PARLEY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    PathBuf::from(".parley")
}
