//! Message store: identifier assignment and serialized read-modify-write
//! cycles over a `MessageLog`.
//!
//! Every mutation loads the whole document, changes it in memory, and saves it
//! back. All mutations go through one writer lock so two cycles can never
//! interleave and lose each other's updates.

pub mod log;
pub mod memory;

use chrono::Utc;
use parley_types::error::ChatError;
use parley_types::message::{is_blank, Message, MessageId};
use tokio::sync::Mutex;
use tracing::{debug, info};

use self::log::MessageLog;

/// Fields of a message supplied by the caller. Everything else (id,
/// timestamps) is assigned by the store.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub text: String,
    pub sender: String,
    pub is_bot: bool,
}

impl MessageDraft {
    pub fn user(text: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: sender.into(),
            is_bot: false,
        }
    }

    pub fn bot(text: impl Into<String>, bot_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: bot_name.into(),
            is_bot: true,
        }
    }
}

/// Sole owner of the chat log.
///
/// Generic over `MessageLog` so core never depends on parley-infra.
pub struct MessageStore<L: MessageLog> {
    log: L,
    /// Writer lock. Guards the highest id ever issued by this store so ids
    /// are not reused after the newest message (or every message) is deleted.
    writer: Mutex<MessageId>,
}

impl<L: MessageLog> MessageStore<L> {
    pub fn new(log: L) -> Self {
        Self {
            log,
            writer: Mutex::new(0),
        }
    }

    /// Access the underlying log.
    pub fn log(&self) -> &L {
        &self.log
    }

    /// All messages in insertion order.
    pub async fn list(&self) -> Result<Vec<Message>, ChatError> {
        Ok(self.log.load().await?)
    }

    pub async fn get(&self, id: MessageId) -> Result<Message, ChatError> {
        self.log
            .load()
            .await?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or(ChatError::NotFound(id))
    }

    /// Append a message, assigning the next id and the creation timestamp.
    ///
    /// Text is trimmed before storage; blank text is rejected.
    pub async fn append(&self, draft: MessageDraft) -> Result<Message, ChatError> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(ChatError::InvalidArgument(
                "message text is required".to_string(),
            ));
        }

        let mut high_water = self.writer.lock().await;
        let mut messages = self.log.load().await?;

        let max_existing = messages.iter().map(|m| m.id).max().unwrap_or(0);
        let id = max_existing.max(*high_water) + 1;

        let message = Message {
            id,
            text: text.to_string(),
            sender: draft.sender,
            is_bot: draft.is_bot,
            created_at: Utc::now(),
            updated_at: None,
        };
        messages.push(message.clone());
        self.log.save(&messages).await?;
        *high_water = id;

        debug!(message_id = id, sender = %message.sender, is_bot = message.is_bot, "Message appended");
        Ok(message)
    }

    /// Replace the text of a message and stamp `updated_at`.
    pub async fn update(&self, id: MessageId, text: &str) -> Result<Message, ChatError> {
        if is_blank(text) {
            return Err(ChatError::InvalidArgument(
                "message text is required".to_string(),
            ));
        }

        let _guard = self.writer.lock().await;
        let mut messages = self.log.load().await?;

        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ChatError::NotFound(id))?;
        message.text = text.trim().to_string();
        message.updated_at = Some(Utc::now());
        let updated = message.clone();

        self.log.save(&messages).await?;
        debug!(message_id = id, "Message updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: MessageId) -> Result<(), ChatError> {
        let mut high_water = self.writer.lock().await;
        let mut messages = self.log.load().await?;

        let index = messages
            .iter()
            .position(|m| m.id == id)
            .ok_or(ChatError::NotFound(id))?;
        messages.remove(index);

        self.log.save(&messages).await?;
        *high_water = (*high_water).max(id);
        debug!(message_id = id, "Message deleted");
        Ok(())
    }

    /// Clear the whole collection.
    ///
    /// Succeeds even when the current document cannot be read; only the
    /// write has to go through.
    pub async fn delete_all(&self) -> Result<(), ChatError> {
        let mut high_water = self.writer.lock().await;

        if let Ok(existing) = self.log.load().await {
            if let Some(max) = existing.iter().map(|m| m.id).max() {
                *high_water = (*high_water).max(max);
            }
        }

        self.log.save(&[]).await?;
        info!("All messages deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
