//! Conversation message repository.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use willpower_core::{MessageId, MessageRole};

use super::RepositoryError;
use crate::models::Message;

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    user_id: String,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let role = MessageRole::from_str(&row.role).map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: MessageId::new(row.id),
            user_id: row.user_id,
            role,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

/// Repository for conversation messages.
pub struct MessageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message to a user's conversation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(
        &self,
        user_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r"
            INSERT INTO messages (user_id, role, content, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, user_id, role, content, created_at
            ",
        )
        .bind(user_id)
        .bind(role.to_string())
        .bind(content)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// The most recent messages for a user, in chronological order.
    ///
    /// Fetches newest-first so the limit trims old history, then reverses
    /// so callers see oldest-to-newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored role is invalid.
    pub async fn recent_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r"
            SELECT id, user_id, role, content, created_at
            FROM messages
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        let mut messages = rows
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    /// Count of messages a user has sent (assistant replies excluded).
    ///
    /// Drives funnel stage selection: 0 prior user messages means the
    /// next inbound message is the first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_user_messages(&self, user_id: &str) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM messages
            WHERE user_id = ?1 AND role = 'user'
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
