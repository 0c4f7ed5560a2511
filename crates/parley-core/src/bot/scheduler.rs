//! Deferred bot replies.
//!
//! Each user message schedules one reply task. The task sleeps for the
//! configured delay, then classifies the original text and appends a bot
//! message through the store. The store is re-read at fire time, so edits and
//! deletes made in the meantime are respected.
//!
//! Tickets move through `ReplyState`:
//! - `Pending` until the delay elapses, or `Cancelled` if cancelled first
//! - `Fired` once the delay elapsed and the append is under way
//! - `Completed` after the append, or `Failed` if it errored (never retried)
//!
//! Pending timers are not persisted. A crash between scheduling and firing
//! drops the reply.
//!
//! Only the most recent `FINISHED_TICKET_RETENTION` finished tickets stay
//! observable; older ones are evicted as new tickets finish.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use parley_types::error::ChatError;
use parley_types::reply::{ReplyState, ReplyTicket};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::rules::ResponseRules;
use crate::store::log::MessageLog;
use crate::store::{MessageDraft, MessageStore};

/// Number of finished tickets whose state is kept for inspection.
pub const FINISHED_TICKET_RETENTION: usize = 256;

/// Ticket states plus the eviction order of finished tickets.
#[derive(Default)]
struct TicketBoard {
    states: DashMap<Uuid, ReplyState>,
    finished: Mutex<VecDeque<Uuid>>,
}

impl TicketBoard {
    fn set(&self, id: Uuid, state: ReplyState) {
        self.states.insert(id, state);
        if !state.is_finished() {
            return;
        }

        let mut finished = lock(&self.finished);
        finished.push_back(id);
        while finished.len() > FINISHED_TICKET_RETENTION {
            if let Some(evicted) = finished.pop_front() {
                self.states.remove(&evicted);
            }
        }
    }

    fn prune_finished(&self) -> usize {
        let mut finished = lock(&self.finished);
        let before = self.states.len();
        self.states.retain(|_, state| !state.is_finished());
        finished.clear();
        before - self.states.len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Schedules and tracks one-shot bot replies.
pub struct ReplyScheduler<L: MessageLog + 'static> {
    store: Arc<MessageStore<L>>,
    rules: Arc<ResponseRules>,
    bot_name: String,
    tickets: Arc<TicketBoard>,
    /// Token shared by every reply scheduled since the last `cancel_pending`.
    generation: Mutex<CancellationToken>,
    /// Parent of every generation; cancelled once on shutdown.
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl<L: MessageLog + 'static> ReplyScheduler<L> {
    pub fn new(
        store: Arc<MessageStore<L>>,
        rules: Arc<ResponseRules>,
        bot_name: impl Into<String>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        Self {
            store,
            rules,
            bot_name: bot_name.into(),
            tickets: Arc::new(TicketBoard::default()),
            generation: Mutex::new(shutdown.child_token()),
            shutdown,
            tracker: TaskTracker::new(),
        }
    }

    /// Schedule a reply to `original_text` from `sender`, due after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(
        &self,
        original_text: impl Into<String>,
        sender: impl Into<String>,
        delay: Duration,
    ) -> ReplyTicket {
        let id = Uuid::now_v7();
        let deadline = tokio::time::Instant::now() + delay;
        let due_at = Utc::now() + TimeDelta::from_std(delay).unwrap_or(TimeDelta::zero());
        self.tickets.set(id, ReplyState::Pending);

        let task = ReplyTask {
            id,
            original_text: original_text.into(),
            sender: sender.into(),
            bot_name: self.bot_name.clone(),
            store: Arc::clone(&self.store),
            rules: Arc::clone(&self.rules),
            tickets: Arc::clone(&self.tickets),
        };
        let cancel = self.lock_generation().clone();

        debug!(
            reply_id = %id,
            sender = %task.sender,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Bot reply scheduled"
        );
        self.tracker.spawn(task.run(deadline, cancel));

        ReplyTicket { id, due_at }
    }

    /// Current state of a ticket. `None` for unknown or pruned tickets.
    pub fn state(&self, id: &Uuid) -> Option<ReplyState> {
        self.tickets.states.get(id).map(|entry| *entry.value())
    }

    /// Number of replies still waiting for their delay to elapse.
    pub fn pending_count(&self) -> usize {
        self.tickets
            .states
            .iter()
            .filter(|entry| *entry.value() == ReplyState::Pending)
            .count()
    }

    /// Cancel every reply that has not fired yet.
    ///
    /// Replies scheduled afterwards are unaffected. Replies that already fired
    /// run to completion.
    pub fn cancel_pending(&self) {
        let mut generation = self.lock_generation();
        let previous = std::mem::replace(&mut *generation, self.shutdown.child_token());
        previous.cancel();
        info!(pending = self.pending_count(), "Cancelling pending bot replies");
    }

    /// Forget finished tickets. Returns how many were removed.
    pub fn prune_finished(&self) -> usize {
        self.tickets.prune_finished()
    }

    /// Number of tickets currently tracked, pending or finished.
    pub fn ticket_count(&self) -> usize {
        self.tickets.states.len()
    }

    /// Wait until every scheduled reply has finished, without cancelling.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Cancel pending replies and wait for in-flight ones. Replies scheduled
    /// after this call are cancelled immediately.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("Reply scheduler stopped");
    }

    fn lock_generation(&self) -> MutexGuard<'_, CancellationToken> {
        lock(&self.generation)
    }
}

/// Everything one reply needs once it fires.
struct ReplyTask<L: MessageLog> {
    id: Uuid,
    original_text: String,
    sender: String,
    bot_name: String,
    store: Arc<MessageStore<L>>,
    rules: Arc<ResponseRules>,
    tickets: Arc<TicketBoard>,
}

impl<L: MessageLog> ReplyTask<L> {
    async fn run(self, deadline: tokio::time::Instant, cancel: CancellationToken) {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.set_state(ReplyState::Cancelled);
                debug!(reply_id = %self.id, "Bot reply cancelled before firing");
                return;
            }
            _ = tokio::time::sleep_until(deadline) => {}
        }

        self.set_state(ReplyState::Fired);
        let reply_text = self.rules.classify(&self.original_text, &self.sender);

        match self
            .store
            .append(MessageDraft::bot(reply_text, self.bot_name.as_str()))
            .await
        {
            Ok(message) => {
                self.set_state(ReplyState::Completed);
                info!(
                    reply_id = %self.id,
                    message_id = message.id,
                    sender = %self.sender,
                    reply = %message.text,
                    "Bot replied"
                );
            }
            Err(e) => {
                self.set_state(ReplyState::Failed);
                let err = ChatError::Scheduling(e.to_string());
                error!(reply_id = %self.id, sender = %self.sender, error = %err, "Dropping bot reply");
            }
        }
    }

    fn set_state(&self, state: ReplyState) {
        self.tickets.set(self.id, state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
