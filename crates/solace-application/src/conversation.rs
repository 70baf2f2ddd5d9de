//! Chat log driver with simulated reply latency.
//!
//! A user message is appended at once. The reply is chosen immediately but
//! appended by a spawned task after the configured latency, which keeps the
//! `is_responding` flag raised in the meantime. Scheduled replies cannot be
//! cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use solace_core::conversation::{ChatMessage, Responder, WELCOME_MESSAGE};
use solace_core::error::{Result, SolaceError};

use crate::state_store::{Slice, StateStore};

#[derive(Debug, Clone)]
pub struct ConversationEngine {
    store: StateStore,
    responder: Arc<Responder>,
    latency: Duration,
    pending: Arc<AtomicUsize>,
}

impl ConversationEngine {
    pub fn new(store: StateStore, responder: Responder, latency: Duration) -> Self {
        Self {
            store,
            responder: Arc::new(responder),
            latency,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Appends the welcome message when the chat log is empty.
    ///
    /// Returns whether a message was added. The welcome is not a reply, so it
    /// is appended without latency and never raises `is_responding`. Nothing
    /// happens while the persisted log is still loading.
    pub fn ensure_welcome(&self) -> Result<bool> {
        if !self.store.is_loaded() {
            return Ok(false);
        }
        let added = self.store.mutate(&[Slice::ChatLog], |state| {
            if !state.chat_log.is_empty() {
                return Ok(false);
            }
            state.chat_log.push(ChatMessage::agent(WELCOME_MESSAGE));
            Ok(true)
        })?;
        if added {
            tracing::debug!("Chat log seeded with welcome message");
        }
        Ok(added)
    }

    /// Appends a user message and schedules the reply.
    ///
    /// The reply is scheduled on the current tokio runtime. Without one the
    /// message is rejected and the log is left untouched.
    pub fn send_message(&self, text: &str) -> Result<PendingReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SolaceError::validation("Message is empty"));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SolaceError::internal(format!("cannot schedule reply: {e}")))?;

        let user_message = ChatMessage::user(text);
        let appended = user_message.clone();
        self.store.mutate(&[Slice::ChatLog], move |state| {
            state.chat_log.push(appended);
            Ok(())
        })?;

        let reply_text = self.responder.respond(text).to_string();
        tracing::debug!(
            rule = self.responder.matched_rule(text).unwrap_or("fallback"),
            "Reply scheduled"
        );

        let guard = RespondingGuard::raise(self.pending.clone());
        let store = self.store.clone();
        let latency = self.latency;
        let handle = runtime.spawn(async move {
            let _guard = guard;
            tokio::time::sleep(latency).await;

            let reply = ChatMessage::agent(reply_text);
            let appended = reply.clone();
            if let Err(e) = store.mutate(&[Slice::ChatLog], move |state| {
                state.chat_log.push(appended);
                Ok(())
            }) {
                tracing::warn!(error = %e, "Reply appended but not persisted");
            }
            reply
        });

        Ok(PendingReply {
            user_message,
            handle,
        })
    }

    /// True while at least one reply is scheduled but not yet appended.
    pub fn is_responding(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub fn chat_log(&self) -> Vec<ChatMessage> {
        self.store.read(|state| state.chat_log.clone())
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }
}

/// Handle to a reply that has been scheduled but may not be appended yet.
///
/// Dropping the handle does not cancel the reply.
#[derive(Debug)]
pub struct PendingReply {
    user_message: ChatMessage,
    handle: JoinHandle<ChatMessage>,
}

impl PendingReply {
    /// The user message that was appended.
    pub fn user_message(&self) -> &ChatMessage {
        &self.user_message
    }

    /// Waits until the reply has been appended and returns it.
    pub async fn reply(self) -> Result<ChatMessage> {
        self.handle
            .await
            .map_err(|e| SolaceError::internal(format!("reply task failed: {e}")))
    }
}

/// Keeps the pending-reply count raised for as long as it lives.
struct RespondingGuard(Arc<AtomicUsize>);

impl RespondingGuard {
    fn raise(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RespondingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
