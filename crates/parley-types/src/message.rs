//! Chat message domain types for Parley.
//!
//! A `Message` is one entry of the chat log, authored either by a user or by
//! the rule-based bot. Messages are serialized with camelCase keys, which is
//! also the layout of the persisted JSON document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned message identifier. Positive and unique within a store.
pub type MessageId = u64;

/// A single chat log entry.
///
/// `created_at` is set once by the store. `updated_at` is only ever set by an
/// explicit update. Documents written by older versions used `user` and
/// `timestamp` instead of `sender` and `createdAt`; both spellings are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    #[serde(alias = "user")]
    pub sender: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Whether the message has been edited since creation.
    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some()
    }
}

/// Request payload for creating a user message.
///
/// `sender` is optional; the service substitutes the configured guest label
/// when it is absent or blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMessage {
    pub text: String,
    #[serde(default, alias = "user", skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl NewMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// Request payload for editing the text of an existing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMessage {
    pub text: String,
}

/// Returns true when `text` is empty or consists only of whitespace.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Message {
        Message {
            id: 7,
            text: "Привет".to_string(),
            sender: "Аня".to_string(),
            is_bot: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"isBot\":false"));
        assert!(json.contains("\"createdAt\""));
        // updatedAt is omitted until the message is edited
        assert!(!json.contains("updatedAt"));
    }

    #[test]
    fn test_message_reads_legacy_keys() {
        let legacy = r#"{
            "id": 3,
            "text": "Как дела?",
            "user": "Боб",
            "isBot": false,
            "timestamp": "2024-05-01T10:00:00.000Z"
        }"#;
        let msg: Message = serde_json::from_str(legacy).unwrap();
        assert_eq!(msg.id, 3);
        assert_eq!(msg.sender, "Боб");
        assert!(!msg.is_edited());
    }

    #[test]
    fn test_message_with_updated_at_roundtrip() {
        let mut msg = sample();
        msg.updated_at = Some(Utc::now());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("updatedAt"));
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
        assert!(parsed.is_edited());
    }

    #[test]
    fn test_new_message_accepts_user_alias() {
        let req: NewMessage = serde_json::from_str(r#"{"text":"hi","user":"Аня"}"#).unwrap();
        assert_eq!(req.sender.as_deref(), Some("Аня"));

        let req: NewMessage = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert!(req.sender.is_none());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   \n\t"));
        assert!(!is_blank(" a "));
    }
}
