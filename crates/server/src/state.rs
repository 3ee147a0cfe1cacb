//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::ServerConfig;
use crate::groq::{GroqClient, GroqError};
use crate::printful::{PrintfulClient, PrintfulError};
use crate::services::mirror::{MirrorClient, MirrorError};

/// Error building an API client from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateInitError {
    #[error("Groq client: {0}")]
    Groq(#[from] GroqError),
    #[error("Printful client: {0}")]
    Printful(#[from] PrintfulError),
    #[error("Supabase mirror client: {0}")]
    Mirror(#[from] MirrorError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Each external integration is `Option`al:
/// a missing credential disables that integration instead of preventing
/// startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: SqlitePool,
    groq: Option<GroqClient>,
    printful: Option<PrintfulClient>,
    mirror: Option<MirrorClient>,
}

impl AppState {
    /// Create a new application state, building clients for every
    /// configured integration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured API key cannot be used to build
    /// an HTTP client.
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Result<Self, StateInitError> {
        let groq = config.groq.as_ref().map(GroqClient::new).transpose()?;
        let printful = config
            .printful
            .as_ref()
            .map(PrintfulClient::new)
            .transpose()?;
        let mirror = config
            .supabase
            .as_ref()
            .map(MirrorClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                groq,
                printful,
                mirror,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get the Groq client, if configured.
    #[must_use]
    pub fn groq(&self) -> Option<&GroqClient> {
        self.inner.groq.as_ref()
    }

    /// Get the Printful client, if configured.
    #[must_use]
    pub fn printful(&self) -> Option<&PrintfulClient> {
        self.inner.printful.as_ref()
    }

    /// Get the Supabase mirror client, if configured.
    #[must_use]
    pub fn mirror(&self) -> Option<&MirrorClient> {
        self.inner.mirror.as_ref()
    }
}
