//! In-memory `MessageLog` for tests and ephemeral runs.

use parley_types::error::RepositoryError;
use parley_types::message::Message;
use tokio::sync::RwLock;

use super::log::MessageLog;

/// A `MessageLog` that keeps the document in process memory.
///
/// Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryMessageLog {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document, e.g. one loaded elsewhere.
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: RwLock::new(messages),
        }
    }
}

impl MessageLog for InMemoryMessageLog {
    async fn load(&self) -> Result<Vec<Message>, RepositoryError> {
        Ok(self.messages.read().await.clone())
    }

    async fn save(&self, messages: &[Message]) -> Result<(), RepositoryError> {
        *self.messages.write().await = messages.to_vec();
        Ok(())
    }
}
