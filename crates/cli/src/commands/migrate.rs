//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! willpower-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - SQLite connection string (default: `sqlite:willpower_fitness.db`)

use tracing::info;

use willpower_server::db;

/// Run database migrations.
///
/// The server also runs migrations at startup; this command exists for
/// preparing a database ahead of a deploy or after restoring a backup.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:willpower_fitness.db".to_string());

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
