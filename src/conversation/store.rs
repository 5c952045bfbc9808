//! Conversation thread and message persistence (MySQL).

use crate::{ConversationTurn, Role};

use async_trait::async_trait;
use sqlx::{MySqlPool, Row as _};

/// Stable internal identifier of a tracked conversation thread row.
pub type ThreadRecordId = i64;

/// Durable conversation state.
///
/// Every operation degrades instead of raising: a `None`/empty result means
/// the store could not be reached, and callers decide how visible to make
/// that. Nothing here is allowed to take the process down.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Resolve the internal record for a Discord thread, inserting one on
    /// first contact. Attribution of an existing record is never rewritten.
    async fn get_or_create_thread(
        &self,
        discord_thread_id: u64,
        user_id: u64,
        channel_id: u64,
    ) -> Option<ThreadRecordId>;

    /// Append one turn to a thread. Failures are logged and swallowed.
    async fn append_message(&self, thread: ThreadRecordId, role: Role, content: &str);

    /// Load up to `limit` of the most recent turns, oldest first.
    async fn load_recent(&self, thread: ThreadRecordId, limit: i64) -> Vec<ConversationTurn>;
}

/// MySQL-backed [`ConversationStore`].
#[derive(Debug, Clone)]
pub struct HistoryStore {
    pool: MySqlPool,
}

impl HistoryStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for HistoryStore {
    async fn get_or_create_thread(
        &self,
        discord_thread_id: u64,
        user_id: u64,
        channel_id: u64,
    ) -> Option<ThreadRecordId> {
        // Insert-or-fetch in one statement: on a duplicate external id the
        // no-op assignment routes the existing row's id through
        // LAST_INSERT_ID, so two racing creates converge on the same record.
        let result = sqlx::query(
            "INSERT INTO conversation_threads (discord_thread_id, user_id, channel_id) \
             VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE id = LAST_INSERT_ID(id)",
        )
        .bind(discord_thread_id)
        .bind(user_id)
        .bind(channel_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Some(done.last_insert_id() as ThreadRecordId),
            Err(error) => {
                tracing::warn!(%error, discord_thread_id, "failed to resolve conversation thread");
                None
            }
        }
    }

    async fn append_message(&self, thread: ThreadRecordId, role: Role, content: &str) {
        if let Err(error) =
            sqlx::query("INSERT INTO messages (thread_db_id, role, content) VALUES (?, ?, ?)")
                .bind(thread)
                .bind(role.as_str())
                .bind(content)
                .execute(&self.pool)
                .await
        {
            tracing::warn!(%error, thread, role = %role, "failed to persist message");
            return;
        }

        // Best-effort activity marker; history stays correct without it.
        if let Err(error) = sqlx::query(
            "UPDATE conversation_threads SET last_activity_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(thread)
        .execute(&self.pool)
        .await
        {
            tracing::warn!(%error, thread, "failed to refresh thread activity timestamp");
        }
    }

    async fn load_recent(&self, thread: ThreadRecordId, limit: i64) -> Vec<ConversationTurn> {
        // Fetch the newest rows, then flip them so the model reads the
        // window oldest first. Keeps unbounded histories capped at `limit`.
        let rows = match sqlx::query(
            "SELECT role, content FROM messages \
             WHERE thread_db_id = ? \
             ORDER BY created_at DESC, id DESC \
             LIMIT ?",
        )
        .bind(thread)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        {
            Ok(rows) => rows,
            Err(error) => {
                tracing::warn!(%error, thread, "failed to load conversation history");
                return Vec::new();
            }
        };

        let mut turns: Vec<ConversationTurn> = rows
            .into_iter()
            .filter_map(|row| {
                let role: String = row.try_get("role").ok()?;
                let content: String = row.try_get("content").ok()?;
                match Role::parse(&role) {
                    Some(role) => Some(ConversationTurn {
                        role,
                        text: content,
                    }),
                    None => {
                        tracing::warn!(role = %role, thread, "skipping message with unknown role");
                        None
                    }
                }
            })
            .collect();

        turns.reverse();
        turns
    }
}
