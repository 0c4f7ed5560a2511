use thiserror::Error;

use crate::message::MessageId;

/// Errors surfaced by chat log operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("message {0} not found")]
    NotFound(MessageId),

    #[error("storage error: {0}")]
    Storage(String),

    /// A deferred bot reply could not be appended when it fired.
    /// Only ever logged; the request that scheduled it has already completed.
    #[error("scheduling error: {0}")]
    Scheduling(String),
}

/// Errors from the durable message log (used by the trait in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("io error: {0}")]
    Io(String),

    #[error("corrupt document: {0}")]
    Corrupt(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        ChatError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::NotFound(42).to_string(), "message 42 not found");
        let err = ChatError::InvalidArgument("text is required".to_string());
        assert_eq!(err.to_string(), "invalid argument: text is required");
    }

    #[test]
    fn test_repository_error_converts_to_storage() {
        let err: ChatError = RepositoryError::Corrupt("expected array".to_string()).into();
        assert!(matches!(err, ChatError::Storage(ref m) if m.contains("expected array")));
    }
}
