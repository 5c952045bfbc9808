//! Per-event conversation turn pipeline.

use crate::conversation::store::{ConversationStore, ThreadRecordId};
use crate::llm::CompletionProvider;
use crate::Role;

use std::sync::Arc;

/// Runs one conversation turn end to end: persist the inbound prompt, load
/// the updated window, query the model, persist the reply.
///
/// The engine is platform-agnostic; the Discord adapter owns everything that
/// touches channels, threads, and mentions.
pub struct ChatEngine {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    window_limit: i64,
}

impl ChatEngine {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn CompletionProvider>,
        window_limit: i64,
    ) -> Self {
        Self {
            store,
            provider,
            window_limit,
        }
    }

    /// Resolve the internal record for an external thread id, creating it on
    /// first contact. `None` means the store is unreachable.
    pub async fn resolve_thread(
        &self,
        external_thread_id: u64,
        user_id: u64,
        channel_id: u64,
    ) -> Option<ThreadRecordId> {
        self.store
            .get_or_create_thread(external_thread_id, user_id, channel_id)
            .await
    }

    /// Run one turn and return the model reply, already persisted.
    ///
    /// The prompt is appended before the window is loaded so the model sees
    /// it as the final turn of the history rather than as a separate
    /// argument. `None` covers every degraded outcome: unreachable store,
    /// provider failure, or a response with no usable text.
    pub async fn run_turn(&self, thread: ThreadRecordId, prompt: &str) -> Option<String> {
        self.store.append_message(thread, Role::User, prompt).await;

        let history = self.store.load_recent(thread, self.window_limit).await;
        if history.is_empty() {
            // The append above cannot have landed either; skip the model
            // rather than querying it with nothing.
            tracing::warn!(thread, "no history available after append, skipping model call");
            return None;
        }

        tracing::debug!(thread, turns = history.len(), "submitting conversation window");
        let reply = match self.provider.generate(&history).await {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => {
                tracing::warn!(thread, "model returned no usable text");
                return None;
            }
            Err(error) => {
                tracing::warn!(%error, thread, "model request failed");
                return None;
            }
        };

        self.store.append_message(thread, Role::Model, &reply).await;
        Some(reply)
    }
}
