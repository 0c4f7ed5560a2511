//! Application state wiring the chat service to its infrastructure.
//!
//! AppState holds the concrete service instance used by both CLI and REST API.
//! The service is generic over the message log, but AppState pins it to the
//! JSON file implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use parley_core::bot::rules::ResponseRules;
use parley_core::chat::service::ChatService;
use parley_infra::config::load_chat_config;
use parley_infra::filesystem::{messages_path, resolve_data_dir, JsonFileMessageLog};
use parley_types::config::ChatConfig;

/// Concrete type alias for the service generic pinned to the infra log.
pub type ConcreteChatService = ChatService<JsonFileMessageLog>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers. Built once per process.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: resolve the data directory, load
    /// `config.toml`, wire the service.
    pub async fn init(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(resolve_data_dir);

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("creating data directory {}", data_dir.display()))?;

        let config = load_chat_config(&data_dir).await;
        Ok(Self::with_config(data_dir, config))
    }

    /// Wire the service from an explicit config.
    pub fn with_config(data_dir: PathBuf, config: ChatConfig) -> Self {
        let log = JsonFileMessageLog::new(messages_path(&data_dir, &config.messages_file));
        tracing::debug!(path = %log.path().display(), "Using message file");

        let chat_service = ChatService::new(log, ResponseRules::default(), config);

        Self {
            chat_service: Arc::new(chat_service),
            data_dir,
        }
    }
}
