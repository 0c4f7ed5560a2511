//! Configuration types for Parley.
//!
//! `ChatConfig` represents the `config.toml` in the data directory that
//! controls the bot reply delay, the bot identity, and storage location.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Display name given to user messages that arrive without a sender.
pub const DEFAULT_SENDER: &str = "Гость";

/// Fixed sender identity of bot replies.
pub const DEFAULT_BOT_NAME: &str = "bot";

/// Top-level configuration for a Parley chat log.
///
/// Loaded from `~/.parley/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Delay between a user message and the bot reply, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Sender name attached to every bot reply.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    /// Sender name used when a user message has none.
    #[serde(default = "default_sender")]
    pub default_sender: String,

    /// File name of the message document, relative to the data directory.
    #[serde(default = "default_messages_file")]
    pub messages_file: String,
}

fn default_reply_delay_ms() -> u64 {
    1_000
}

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

fn default_sender() -> String {
    DEFAULT_SENDER.to_string()
}

fn default_messages_file() -> String {
    "messages.json".to_string()
}

impl ChatConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            bot_name: default_bot_name(),
            default_sender: default_sender(),
            messages_file: default_messages_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_default_values() {
        let config = ChatConfig::default();
        assert_eq!(config.reply_delay(), Duration::from_secs(1));
        assert_eq!(config.bot_name, "bot");
        assert_eq!(config.default_sender, "Гость");
        assert_eq!(config.messages_file, "messages.json");
    }

    #[test]
    fn test_chat_config_deserialize_with_defaults() {
        let config: ChatConfig = toml::from_str("").unwrap();
        assert_eq!(config.reply_delay_ms, 1_000);
        assert_eq!(config.bot_name, DEFAULT_BOT_NAME);
    }

    #[test]
    fn test_chat_config_deserialize_partial() {
        let config: ChatConfig = toml::from_str(
            r#"
reply_delay_ms = 250
bot_name = "Робот"
"#,
        )
        .unwrap();
        assert_eq!(config.reply_delay(), Duration::from_millis(250));
        assert_eq!(config.bot_name, "Робот");
        assert_eq!(config.default_sender, DEFAULT_SENDER);
    }
}
