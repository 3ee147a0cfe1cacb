//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use willpower_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    user_id: String,
    name: String,
    email: Option<String>,
    goal: String,
    source: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .map(|e| {
                Email::parse(&e).map_err(|err| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {err}"))
                })
            })
            .transpose()?;

        Ok(Self {
            id: UserId::new(row.id),
            user_id: row.user_id,
            name: row.name,
            email,
            goal: row.goal,
            source: row.source,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create or refresh a user profile.
    ///
    /// `user_id` is the upsert key: re-onboarding with the same ID
    /// updates the profile in place rather than erroring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: &str,
        name: &str,
        email: Option<&Email>,
        goal: &str,
        source: &str,
    ) -> Result<User, RepositoryError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (user_id, name, email, goal, source, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT (user_id) DO UPDATE SET
                name = excluded.name,
                email = COALESCE(excluded.email, users.email),
                goal = excluded.goal,
                source = excluded.source,
                updated_at = excluded.updated_at
            RETURNING id, user_id, name, email, goal, source, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(name)
        .bind(email.map(Email::as_str))
        .bind(goal)
        .bind(source)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a user by their client-supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn get(&self, user_id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, user_id, name, email, goal, source, created_at, updated_at
            FROM users
            WHERE user_id = ?1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_upsert_creates_user() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo
            .upsert("web_abc123", "Alice", None, "lose 10 pounds", "website")
            .await
            .unwrap();

        assert_eq!(user.user_id, "web_abc123");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.goal, "lose 10 pounds");
        assert!(user.email.is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_on_user_id() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let first = repo
            .upsert("web_abc123", "Alice", None, "lose 10 pounds", "website")
            .await
            .unwrap();
        let email = Email::parse("alice@example.com").unwrap();
        let second = repo
            .upsert(
                "web_abc123",
                "Alice W.",
                Some(&email),
                "build muscle",
                "instagram",
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Alice W.");
        assert_eq!(second.goal, "build muscle");
        assert_eq!(second.email, Some(email));
    }

    #[tokio::test]
    async fn test_upsert_keeps_email_when_none() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let email = Email::parse("alice@example.com").unwrap();
        repo.upsert("web_abc123", "Alice", Some(&email), "get fit", "website")
            .await
            .unwrap();
        let updated = repo
            .upsert("web_abc123", "Alice", None, "get fit", "website")
            .await
            .unwrap();

        assert_eq!(updated.email, Some(email));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        assert!(repo.get("nope").await.unwrap().is_none());
    }
}
