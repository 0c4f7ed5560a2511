//! Bot reply types: the synchronous probe result and the deferred reply
//! lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of computing a bot reply without persisting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotReply {
    pub original_text: String,
    pub sender: String,
    pub reply_text: String,
}

/// Lifecycle of one deferred bot reply.
///
/// ```text
/// Pending -> Fired -> Completed
///                  -> Failed      (append failed; reply dropped)
/// Pending -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyState {
    Pending,
    Fired,
    Completed,
    Cancelled,
    Failed,
}

impl ReplyState {
    /// Terminal states never transition again.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            ReplyState::Completed | ReplyState::Cancelled | ReplyState::Failed
        )
    }
}

impl fmt::Display for ReplyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyState::Pending => write!(f, "pending"),
            ReplyState::Fired => write!(f, "fired"),
            ReplyState::Completed => write!(f, "completed"),
            ReplyState::Cancelled => write!(f, "cancelled"),
            ReplyState::Failed => write!(f, "failed"),
        }
    }
}

/// Handle to a scheduled reply, returned by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyTicket {
    /// UUIDv7 ticket ID.
    pub id: Uuid,
    /// Wall-clock time at which the reply is due to fire.
    pub due_at: DateTime<Utc>,
}
