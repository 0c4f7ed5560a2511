//! JSON document implementation of the `MessageLog` port.
//!
//! The whole chat log is one pretty-printed JSON array. Writes go to a
//! sibling `.tmp` file that is then renamed over the target, so readers never
//! observe a half-written document.

use std::path::{Path, PathBuf};

use parley_core::store::log::MessageLog;
use parley_types::error::RepositoryError;
use parley_types::message::Message;

/// Chat log persisted as `{data_dir}/messages.json`.
pub struct JsonFileMessageLog {
    path: PathBuf,
}

impl JsonFileMessageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl MessageLog for JsonFileMessageLog {
    async fn load(&self) -> Result<Vec<Message>, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No message file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(RepositoryError::Io(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|err| {
            tracing::warn!("Failed to parse {}: {err}", self.path.display());
            RepositoryError::Corrupt(format!("{}: {err}", self.path.display()))
        })
    }

    async fn save(&self, messages: &[Message]) -> Result<(), RepositoryError> {
        let json = serde_json::to_string_pretty(messages)
            .map_err(|err| RepositoryError::Corrupt(err.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| RepositoryError::Io(err.to_string()))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await.map_err(|err| {
            RepositoryError::Io(format!("failed to write {}: {err}", temp.display()))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|err| {
            RepositoryError::Io(format!(
                "failed to replace {}: {err}",
                self.path.display()
            ))
        })?;

        tracing::trace!(count = messages.len(), path = %self.path.display(), "Message file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use parley_core::store::{MessageDraft, MessageStore};
    use tempfile::TempDir;

    use super::*;

    fn message(id: u64, text: &str) -> Message {
        Message {
            id,
            text: text.to_string(),
            sender: "Аня".to_string(),
            is_bot: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let log = JsonFileMessageLog::new(tmp.path().join("messages.json"));
        assert!(log.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.json");
        tokio::fs::write(&path, "\n").await.unwrap();
        assert!(JsonFileMessageLog::new(path).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let log = JsonFileMessageLog::new(tmp.path().join("messages.json"));
        let messages = vec![message(2, "b"), message(1, "a"), message(3, "c")];

        log.save(&messages).await.unwrap();
        assert_eq!(log.load().await.unwrap(), messages);
    }

    #[tokio::test]
    async fn test_save_writes_pretty_array_and_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.json");
        let log = JsonFileMessageLog::new(&path);

        log.save(&[message(1, "Привет")]).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.starts_with("[\n  {"));
        assert!(raw.contains("\"isBot\": false"));
        assert!(!tmp.path().join("messages.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("data").join("messages.json");
        let log = JsonFileMessageLog::new(&path);

        log.save(&[]).await.unwrap();
        assert!(path.exists());
        assert!(log.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = JsonFileMessageLog::new(&path).load().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_reads_legacy_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.json");
        tokio::fs::write(
            &path,
            r#"[
  {
    "id": 1,
    "text": "Привет",
    "user": "Аня",
    "isBot": false,
    "timestamp": "2024-05-01T10:00:00.000Z"
  },
  {
    "id": 2,
    "text": "Привет, Аня!",
    "user": "bot",
    "isBot": true,
    "timestamp": "2024-05-01T10:00:01.000Z"
  }
]"#,
        )
        .await
        .unwrap();

        let messages = JsonFileMessageLog::new(&path).load().await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, "Аня");
        assert!(messages[1].is_bot);
    }

    #[tokio::test]
    async fn test_store_survives_restart() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("messages.json");

        let store = MessageStore::new(JsonFileMessageLog::new(&path));
        store.append(MessageDraft::user("one", "Аня")).await.unwrap();
        store.append(MessageDraft::user("two", "Аня")).await.unwrap();
        drop(store);

        let reopened = MessageStore::new(JsonFileMessageLog::new(&path));
        let next = reopened
            .append(MessageDraft::user("three", "Аня"))
            .await
            .unwrap();
        assert_eq!(next.id, 3);
        let texts: Vec<_> = reopened
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }
}
