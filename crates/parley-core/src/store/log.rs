//! MessageLog trait definition.
//!
//! The durable representation of the chat log is one ordered document that is
//! always read and written as a whole. Implementations live in parley-infra
//! (e.g., `JsonFileMessageLog`); `InMemoryMessageLog` lives next to this trait.

use parley_types::error::RepositoryError;
use parley_types::message::Message;

/// Whole-document persistence for the ordered message collection.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Callers are responsible for serializing read-modify-write cycles;
/// see `MessageStore`.
pub trait MessageLog: Send + Sync {
    /// Read the full collection in insertion order.
    ///
    /// A log that has never been written reads as empty.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Replace the full collection. Must be atomic: a concurrent `load` sees
    /// either the previous or the new document, never a partial one.
    fn save(
        &self,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
