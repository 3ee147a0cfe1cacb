//! Best-effort conversation mirroring to Supabase.
//!
//! Each chat exchange is also written to a hosted Supabase table for
//! dashboards and manual review. The mirror is strictly fire-and-forget:
//! failures are logged and swallowed so they can never slow down or fail
//! the primary reply path.

use std::sync::Arc;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;

use crate::config::SupabaseConfig;

/// Errors from the Supabase mirror.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Supabase returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Invalid configuration.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Serialize)]
struct ConversationRecord<'a> {
    user_id: &'a str,
    user_message: &'a str,
    ai_response: &'a str,
    timestamp: String,
}

/// Supabase REST client for the `conversations` table.
#[derive(Clone)]
pub struct MirrorClient {
    inner: Arc<MirrorClientInner>,
}

struct MirrorClientInner {
    client: reqwest::Client,
    url: String,
}

impl MirrorClient {
    /// Create a new mirror client.
    ///
    /// # Errors
    ///
    /// Returns an error if the key contains invalid header characters
    /// or the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, MirrorError> {
        let key = config.key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| MirrorError::Parse(format!("Invalid API key format: {e}")))?,
        );
        let mut auth_header = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| MirrorError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(MirrorClientInner {
                client,
                url: config.url.clone(),
            }),
        })
    }

    /// Write one chat exchange to the mirror table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Supabase rejects the row.
    pub async fn log_conversation(
        &self,
        user_id: &str,
        user_message: &str,
        ai_response: &str,
    ) -> Result<(), MirrorError> {
        let record = ConversationRecord {
            user_id,
            user_message,
            ai_response,
            timestamp: Utc::now().to_rfc3339(),
        };

        let url = format!("{}/rest/v1/conversations", self.inner.url);
        let response = self.inner.client.post(&url).json(&record).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MirrorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Mirror an exchange in the background, logging any failure.
    ///
    /// Never blocks the caller and never fails.
    pub fn log_conversation_detached(&self, user_id: &str, user_message: &str, ai_response: &str) {
        let mirror = self.clone();
        let user_id = user_id.to_string();
        let user_message = user_message.to_string();
        let ai_response = ai_response.to_string();

        tokio::spawn(async move {
            if let Err(e) = mirror
                .log_conversation(&user_id, &user_message, &ai_response)
                .await
            {
                tracing::warn!(error = %e, user_id = %user_id, "Conversation mirror write failed");
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> SupabaseConfig {
        SupabaseConfig {
            url: server.uri(),
            key: SecretString::from("sb_test_key"),
        }
    }

    #[tokio::test]
    async fn test_log_conversation_posts_row() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/conversations"))
            .and(header("apikey", "sb_test_key"))
            .and(body_partial_json(json!({
                "user_id": "u1",
                "user_message": "hi",
                "ai_response": "hello!"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let mirror = MirrorClient::new(&test_config(&server)).unwrap();
        mirror.log_conversation("u1", "hi", "hello!").await.unwrap();
    }

    #[tokio::test]
    async fn test_log_conversation_surfaces_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let mirror = MirrorClient::new(&test_config(&server)).unwrap();
        let err = mirror.log_conversation("u1", "hi", "hello!").await.unwrap_err();

        assert!(matches!(err, MirrorError::Api { status: 401, .. }));
    }
}
