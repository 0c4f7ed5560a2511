//! Chat service: the operations exposed to the CLI and REST layers.
//!
//! ChatService validates input, delegates persistence to the MessageStore and
//! schedules a deferred bot reply for every user message it creates.

use std::sync::Arc;

use parley_types::config::ChatConfig;
use parley_types::error::ChatError;
use parley_types::message::{is_blank, Message, MessageId, NewMessage};
use parley_types::reply::BotReply;
use tokio::sync::Mutex;
use tracing::info;

use crate::bot::rules::ResponseRules;
use crate::bot::scheduler::ReplyScheduler;
use crate::store::log::MessageLog;
use crate::store::{MessageDraft, MessageStore};

/// Orchestrates the chat log and the bot.
///
/// Generic over `MessageLog` to maintain clean architecture
/// (parley-core never depends on parley-infra).
pub struct ChatService<L: MessageLog + 'static> {
    store: Arc<MessageStore<L>>,
    rules: Arc<ResponseRules>,
    scheduler: ReplyScheduler<L>,
    config: ChatConfig,
    /// Held across "append + schedule" and "cancel + clear" so a clear never
    /// lands between a message and the scheduling of its reply.
    lifecycle: Mutex<()>,
}

impl<L: MessageLog + 'static> ChatService<L> {
    /// Create a new chat service that owns `log` for its whole lifetime.
    pub fn new(log: L, rules: ResponseRules, config: ChatConfig) -> Self {
        let store = Arc::new(MessageStore::new(log));
        let rules = Arc::new(rules);
        let scheduler =
            ReplyScheduler::new(Arc::clone(&store), Arc::clone(&rules), config.bot_name.clone());
        Self {
            store,
            rules,
            scheduler,
            config,
            lifecycle: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &MessageStore<L> {
        &self.store
    }

    pub fn scheduler(&self) -> &ReplyScheduler<L> {
        &self.scheduler
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    // --- Reads ---

    pub async fn list_messages(&self) -> Result<Vec<Message>, ChatError> {
        self.store.list().await
    }

    pub async fn get_message(&self, id: MessageId) -> Result<Message, ChatError> {
        self.store.get(id).await
    }

    // --- Writes ---

    /// Store a user message and schedule the bot reply.
    ///
    /// Returns as soon as the user message is persisted; the reply is appended
    /// later by the scheduler.
    pub async fn create_message(&self, request: NewMessage) -> Result<Message, ChatError> {
        if is_blank(&request.text) {
            return Err(ChatError::InvalidArgument(
                "message text is required".to_string(),
            ));
        }
        let sender = self.resolve_sender(request.sender.as_deref());

        let _lifecycle = self.lifecycle.lock().await;
        let message = self
            .store
            .append(MessageDraft::user(request.text.as_str(), sender.as_str()))
            .await?;
        info!(message_id = message.id, sender = %sender, "Message created");

        self.scheduler
            .schedule(request.text, sender, self.config.reply_delay());
        Ok(message)
    }

    pub async fn update_message(&self, id: MessageId, text: &str) -> Result<Message, ChatError> {
        let message = self.store.update(id, text).await?;
        info!(message_id = id, "Message updated");
        Ok(message)
    }

    pub async fn delete_message(&self, id: MessageId) -> Result<(), ChatError> {
        self.store.delete(id).await?;
        info!(message_id = id, "Message deleted");
        Ok(())
    }

    /// Clear the chat log.
    ///
    /// Replies that have not fired yet are cancelled first so they do not
    /// repopulate the emptied log. Replies that already fired still land.
    pub async fn delete_all(&self) -> Result<(), ChatError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.scheduler.cancel_pending();
        self.store.delete_all().await?;
        self.scheduler.prune_finished();
        Ok(())
    }

    // --- Bot ---

    /// Compute the bot reply for `text` without storing anything.
    pub fn bot_reply(&self, text: &str, sender: Option<&str>) -> Result<BotReply, ChatError> {
        if is_blank(text) {
            return Err(ChatError::InvalidArgument(
                "message text is required".to_string(),
            ));
        }
        let sender = self.resolve_sender(sender);
        let reply_text = self.rules.classify(text, &sender);
        Ok(BotReply {
            original_text: text.to_string(),
            sender,
            reply_text,
        })
    }

    // --- Lifecycle ---

    /// Wait for every scheduled reply to land.
    pub async fn wait_for_replies(&self) {
        self.scheduler.drain().await;
    }

    /// Cancel pending replies and wait for in-flight ones.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    fn resolve_sender(&self, sender: Option<&str>) -> String {
        match sender.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.config.default_sender.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parley_types::error::RepositoryError;

    use super::*;
    use crate::bot::picker::FixedPicker;
    use crate::bot::scheduler::FINISHED_TICKET_RETENTION;
    use crate::store::memory::InMemoryMessageLog;

    /// Yields around every read and write so concurrent service calls
    /// interleave at the storage boundary.
    #[derive(Default)]
    struct YieldingLog {
        inner: InMemoryMessageLog,
    }

    impl MessageLog for YieldingLog {
        async fn load(&self) -> Result<Vec<Message>, RepositoryError> {
            tokio::task::yield_now().await;
            self.inner.load().await
        }

        async fn save(&self, messages: &[Message]) -> Result<(), RepositoryError> {
            tokio::task::yield_now().await;
            self.inner.save(messages).await
        }
    }

    fn service() -> ChatService<InMemoryMessageLog> {
        ChatService::new(
            InMemoryMessageLog::new(),
            ResponseRules::new(FixedPicker(1)),
            ChatConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_returns_user_message_then_bot_replies() {
        let service = service();

        let created = service
            .create_message(NewMessage::new("Как дела?").with_sender("Боб"))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert!(!created.is_bot);
        assert_eq!(created.sender, "Боб");
        assert_eq!(service.list_messages().await.unwrap().len(), 1);
        assert_eq!(service.scheduler().pending_count(), 1);

        tokio::time::advance(service.config().reply_delay()).await;
        service.wait_for_replies().await;

        let messages = service.list_messages().await.unwrap();
        assert_eq!(messages.len(), 2);
        let reply = &messages[1];
        assert!(reply.is_bot);
        assert_eq!(reply.sender, "bot");
        assert_eq!(reply.text, "У меня хорошо, Боб! А у тебя?");
        assert!(reply.text.contains("Боб"));
    }

    #[tokio::test]
    async fn test_create_defaults_sender_to_guest() {
        let service = service();
        let created = service
            .create_message(NewMessage::new("hello").with_sender("   "))
            .await
            .unwrap();
        assert_eq!(created.sender, "Гость");

        let created = service.create_message(NewMessage::new("hi")).await.unwrap();
        assert_eq!(created.sender, "Гость");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_text_without_scheduling() {
        let service = service();
        let err = service
            .create_message(NewMessage::new(" \n "))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidArgument(_)));
        assert_eq!(service.scheduler().pending_count(), 0);
        assert!(service.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_delegate_to_store() {
        let service = service();
        let created = service
            .create_message(NewMessage::new("draft").with_sender("Аня"))
            .await
            .unwrap();

        let updated = service.update_message(created.id, "final").await.unwrap();
        assert_eq!(updated.text, "final");
        assert!(updated.updated_at.is_some());
        assert_eq!(service.get_message(created.id).await.unwrap().text, "final");

        service.delete_message(created.id).await.unwrap();
        assert!(matches!(
            service.delete_message(created.id).await.unwrap_err(),
            ChatError::NotFound(_)
        ));
        assert!(matches!(
            service.update_message(created.id, "x").await.unwrap_err(),
            ChatError::NotFound(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_all_cancels_pending_replies() {
        let service = service();
        for text in ["привет", "спасибо"] {
            service
                .create_message(NewMessage::new(text).with_sender("Аня"))
                .await
                .unwrap();
        }
        assert_eq!(service.scheduler().pending_count(), 2);

        service.delete_all().await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        service.wait_for_replies().await;

        assert!(service.list_messages().await.unwrap().is_empty());
        assert_eq!(service.scheduler().pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_all_racing_create_leaves_no_orphan_reply() {
        let service = ChatService::new(
            YieldingLog::default(),
            ResponseRules::new(FixedPicker(1)),
            ChatConfig::default(),
        );

        let (created, cleared) = tokio::join!(
            service.create_message(NewMessage::new("привет").with_sender("Аня")),
            service.delete_all(),
        );
        created.unwrap();
        cleared.unwrap();
        assert!(service.list_messages().await.unwrap().is_empty());

        tokio::time::advance(Duration::from_secs(5)).await;
        service.wait_for_replies().await;

        assert!(service.list_messages().await.unwrap().is_empty());
        assert_eq!(service.scheduler().pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_tickets_do_not_accumulate() {
        let service = service();
        for i in 0..300 {
            service
                .create_message(NewMessage::new(format!("message {i}")))
                .await
                .unwrap();
        }
        tokio::time::advance(service.config().reply_delay()).await;
        service.wait_for_replies().await;

        assert_eq!(service.list_messages().await.unwrap().len(), 600);
        assert!(service.scheduler().ticket_count() <= FINISHED_TICKET_RETENTION);
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages_after_delete_all_still_get_replies() {
        let service = service();
        service
            .create_message(NewMessage::new("привет").with_sender("Аня"))
            .await
            .unwrap();
        service.delete_all().await.unwrap();

        let created = service
            .create_message(NewMessage::new("спасибо").with_sender("Аня"))
            .await
            .unwrap();
        // ids keep counting after a clear
        assert_eq!(created.id, 2);

        service.wait_for_replies().await;
        let messages = service.list_messages().await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, "Пожалуйста, Аня!");
    }

    #[tokio::test]
    async fn test_bot_reply_probe() {
        let service = service();
        let reply = service.bot_reply("Привет", Some("Аня")).unwrap();
        assert_eq!(reply.original_text, "Привет");
        assert_eq!(reply.sender, "Аня");
        assert_eq!(reply.reply_text, "Привет, Аня!");

        // same input, same rule outcome
        let again = service.bot_reply("Привет", Some("Аня")).unwrap();
        assert_eq!(again, reply);

        let guest = service.bot_reply("спасибо", None).unwrap();
        assert_eq!(guest.reply_text, "Пожалуйста, Гость!");

        assert!(matches!(
            service.bot_reply("", Some("Аня")).unwrap_err(),
            ChatError::InvalidArgument(_)
        ));
        // probing stores nothing
        assert!(service.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bot_reply_fallback() {
        let service = service();
        assert!(service.rules.matching_rule("asdkjh").is_none());
        let reply = service.bot_reply("asdkjh", Some("Аня")).unwrap();
        assert_eq!(reply.reply_text, "Попробуй спросить по-другому.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_reply() {
        let service = service();
        service
            .create_message(NewMessage::new("привет").with_sender("Аня"))
            .await
            .unwrap();

        service.shutdown().await;
        assert_eq!(service.list_messages().await.unwrap().len(), 1);
        assert_eq!(service.scheduler().pending_count(), 0);
        assert_eq!(service.scheduler().prune_finished(), 1);
    }
}
