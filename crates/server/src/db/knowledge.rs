//! Knowledge base repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use willpower_core::KnowledgeItemId;

use super::RepositoryError;
use crate::models::KnowledgeItem;

#[derive(sqlx::FromRow)]
struct KnowledgeRow {
    id: i64,
    topic: String,
    question: String,
    answer: String,
    category: String,
    source: String,
    created_at: DateTime<Utc>,
}

impl From<KnowledgeRow> for KnowledgeItem {
    fn from(row: KnowledgeRow) -> Self {
        Self {
            id: KnowledgeItemId::new(row.id),
            topic: row.topic,
            question: row.question,
            answer: row.answer,
            category: row.category,
            source: row.source,
            created_at: row.created_at,
        }
    }
}

/// Repository for the coaching knowledge base.
pub struct KnowledgeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> KnowledgeRepository<'a> {
    /// Create a new knowledge repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a Q&A pair. Category and source take their schema defaults
    /// ('general', 'manual').
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(
        &self,
        topic: &str,
        question: &str,
        answer: &str,
    ) -> Result<KnowledgeItem, RepositoryError> {
        let row = sqlx::query_as::<_, KnowledgeRow>(
            r"
            INSERT INTO knowledge_base (topic, question, answer, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, topic, question, answer, category, source, created_at
            ",
        )
        .bind(topic)
        .bind(question)
        .bind(answer)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Keyword search over topic, question and answer.
    ///
    /// Plain substring matching. Good enough for a small curated FAQ;
    /// results feed the prompt builder, so the limit is kept tight.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<KnowledgeItem>, RepositoryError> {
        let pattern = format!("%{query}%");

        let rows = sqlx::query_as::<_, KnowledgeRow>(
            r"
            SELECT id, topic, question, answer, category, source, created_at
            FROM knowledge_base
            WHERE topic LIKE ?1 OR question LIKE ?1 OR answer LIKE ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(KnowledgeItem::from).collect())
    }

    /// Total number of Q&A pairs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM knowledge_base")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_search_matches_any_column() {
        let pool = test_pool().await;
        let repo = KnowledgeRepository::new(&pool);

        repo.add(
            "pricing",
            "How much does membership cost?",
            "Membership is $225/month and includes a free t-shirt.",
        )
        .await
        .unwrap();
        repo.add(
            "training",
            "How often should I work out?",
            "Start with 3 sessions per week.",
        )
        .await
        .unwrap();

        let by_topic = repo.search("pricing", 5).await.unwrap();
        assert_eq!(by_topic.len(), 1);

        let by_answer = repo.search("t-shirt", 5).await.unwrap();
        assert_eq!(by_answer.len(), 1);

        let none = repo.search("swimming", 5).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let pool = test_pool().await;
        let repo = KnowledgeRepository::new(&pool);

        for i in 0..4 {
            repo.add("training", &format!("question {i}"), "lift weights")
                .await
                .unwrap();
        }

        let results = repo.search("weights", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
