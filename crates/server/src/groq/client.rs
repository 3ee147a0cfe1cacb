//! Groq API client.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::GroqConfig;

use super::error::{ApiErrorResponse, GroqError};
use super::types::{ChatMessage, ChatRequest, ChatResponse};

/// Sampling temperature for coaching replies.
const TEMPERATURE: f32 = 0.7;

/// Reply length cap.
const MAX_TOKENS: u32 = 500;

/// Groq chat completions client.
///
/// Cheaply cloneable; the HTTP client and model name are shared via `Arc`.
#[derive(Clone)]
pub struct GroqClient {
    inner: Arc<GroqClientInner>,
}

struct GroqClientInner {
    client: reqwest::Client,
    model: String,
    api_url: String,
}

impl GroqClient {
    /// Create a new Groq client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key contains invalid header characters
    /// or the HTTP client fails to build.
    pub fn new(config: &GroqConfig) -> Result<Self, GroqError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| GroqError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(GroqClientInner {
                client,
                model: config.model.clone(),
                api_url: config.api_url.clone(),
            }),
        })
    }

    /// Send a chat completion request and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API returns an error
    /// response, or the response contains no choices.
    #[instrument(skip(self, messages), fields(model = %self.inner.model))]
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, GroqError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.api_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(GroqError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GroqError::Parse(format!("Failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(GroqError::EmptyResponse)
    }
}
