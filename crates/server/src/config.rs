//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//!
//! None. The server starts with an empty environment and degrades
//! gracefully: features whose credentials are missing are disabled
//! (AI replies fall back to scripted text, webhooks reject, the
//! Supabase mirror is skipped).
//!
//! ## Optional
//! - `DATABASE_URL` - SQLite connection string (default: `sqlite:willpower_fitness.db`)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `ALLOWED_ORIGIN` - CORS origin (default: permissive)
//! - `GROQ_API_KEY` - Groq API key for AI replies
//! - `GROQ_MODEL` - Chat model (default: llama3-8b-8192)
//! - `GROQ_API_URL` - Override for the chat completions endpoint
//! - `STRIPE_WEBHOOK_SECRET` / `STRIPE_PAYMENT_LINK` - Payments (must be set together)
//! - `PRINTFUL_API_KEY` - Printful fulfillment
//! - `PRINTFUL_API_URL` - Override for the Printful API base URL
//! - `SUPABASE_URL` / `SUPABASE_KEY` - Conversation mirror (must be set together)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Default Groq chat completions endpoint.
pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default Groq model for coaching replies.
pub const DEFAULT_GROQ_MODEL: &str = "llama3-8b-8192";

/// Default Printful API base URL.
pub const DEFAULT_PRINTFUL_API_URL: &str = "https://api.printful.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("{0} and {1} must be set together")]
    IncompletePair(&'static str, &'static str),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite connection string
    pub database_url: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// CORS origin allowed to call the API (None = permissive)
    pub allowed_origin: Option<String>,
    /// Groq chat API configuration (None disables AI replies)
    pub groq: Option<GroqConfig>,
    /// Stripe payments configuration (None disables the webhook + checkout)
    pub stripe: Option<StripeConfig>,
    /// Printful fulfillment configuration (None disables t-shirt orders)
    pub printful: Option<PrintfulConfig>,
    /// Supabase conversation mirror (None disables mirroring)
    pub supabase: Option<SupabaseConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Groq chat API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GroqConfig {
    /// Groq API key
    pub api_key: SecretString,
    /// Chat model identifier
    pub model: String,
    /// Chat completions endpoint
    pub api_url: String,
}

impl std::fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Stripe payments configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Webhook signing secret (whsec_...)
    pub webhook_secret: SecretString,
    /// Hosted payment link handed to prospects
    pub payment_link: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("webhook_secret", &"[REDACTED]")
            .field("payment_link", &self.payment_link)
            .finish()
    }
}

/// Printful fulfillment configuration.
#[derive(Clone)]
pub struct PrintfulConfig {
    /// Printful API key
    pub api_key: SecretString,
    /// API base URL
    pub api_url: String,
}

impl std::fmt::Debug for PrintfulConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintfulConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Supabase conversation mirror configuration.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project REST URL (https://<project>.supabase.co)
    pub url: String,
    /// Service role or anon key
    pub key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable fails to parse or one half of
    /// a paired variable set is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_env_or_default("DATABASE_URL", "sqlite:willpower_fitness.db");
        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let allowed_origin = get_optional_env("ALLOWED_ORIGIN");

        let groq = GroqConfig::from_env();
        let stripe = StripeConfig::from_env()?;
        let printful = PrintfulConfig::from_env();
        let supabase = SupabaseConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            allowed_origin,
            groq,
            stripe,
            printful,
            supabase,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GroqConfig {
    fn from_env() -> Option<Self> {
        let api_key = get_optional_env("GROQ_API_KEY")?;
        Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default("GROQ_MODEL", DEFAULT_GROQ_MODEL),
            api_url: get_env_or_default("GROQ_API_URL", DEFAULT_GROQ_API_URL),
        })
    }
}

impl StripeConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let secret = get_optional_env("STRIPE_WEBHOOK_SECRET");
        let link = get_optional_env("STRIPE_PAYMENT_LINK");

        match (secret, link) {
            (Some(secret), Some(link)) => Ok(Some(Self {
                webhook_secret: SecretString::from(secret),
                payment_link: link,
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompletePair(
                "STRIPE_WEBHOOK_SECRET",
                "STRIPE_PAYMENT_LINK",
            )),
        }
    }
}

impl PrintfulConfig {
    fn from_env() -> Option<Self> {
        let api_key = get_optional_env("PRINTFUL_API_KEY")?;
        Some(Self {
            api_key: SecretString::from(api_key),
            api_url: get_env_or_default("PRINTFUL_API_URL", DEFAULT_PRINTFUL_API_URL),
        })
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let url = get_optional_env("SUPABASE_URL");
        let key = get_optional_env("SUPABASE_KEY");

        match (url, key) {
            (Some(url), Some(key)) => Ok(Some(Self {
                url: url.trim_end_matches('/').to_string(),
                key: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompletePair("SUPABASE_URL", "SUPABASE_KEY")),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty strings as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
