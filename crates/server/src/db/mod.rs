//! Database operations for the backend's SQLite store.
//!
//! # Tables
//!
//! - `users` - Chat users created at onboarding
//! - `messages` - Conversation history (both roles)
//! - `customers` - Paying members, keyed by email
//! - `tshirt_orders` - Free t-shirt fulfillment orders
//! - `knowledge_base` - Q&A pairs spliced into prompts
//! - `leads` - Marketing site lead captures
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/`. They run at
//! server startup and can also be applied ahead of time via:
//! ```bash
//! cargo run -p willpower-cli -- migrate
//! ```

pub mod customers;
pub mod knowledge;
pub mod leads;
pub mod messages;
pub mod orders;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use customers::CustomerRepository;
pub use knowledge::KnowledgeRepository;
pub use leads::LeadRepository;
pub use messages::MessageRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Embedded migrations from `crates/server/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed to parse back into its domain type.
    #[error("Data corruption: {0}")]
    DataCorruption(String),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// The database file is created if missing; WAL mode keeps readers from
/// blocking the writer.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string is invalid or the
/// database cannot be opened.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use super::MIGRATOR;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory database with migrations applied.
    ///
    /// Capped at one connection: each in-memory SQLite connection is its
    /// own database, so a larger pool would see empty schemas.
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        pool
    }
}
