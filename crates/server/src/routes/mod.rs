//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! POST /api/chat              - Coaching chat (always 200 with a reply)
//! POST /api/onboard           - Create/refresh a chat user profile
//! POST /api/lead-capture      - Capture a lead, return AI response + payment link
//! POST /api/checkout          - Hand out the hosted payment link
//! GET  /api/me?email=...      - Membership lookup
//! GET  /api/status            - Service status
//! POST /api/webhooks/stripe   - Stripe events (signature-verified raw body)
//! POST /api/webhooks/printful - Printful fulfillment callbacks
//! ```

pub mod chat;
pub mod checkout;
pub mod leads;
pub mod members;
pub mod onboard;
pub mod status;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/api/onboard", post(onboard::onboard))
        .route("/api/lead-capture", post(leads::capture))
        .route("/api/checkout", post(checkout::checkout))
        .route("/api/me", get(members::me))
        .route("/api/status", get(status::status))
        .route("/api/webhooks/stripe", post(webhooks::stripe))
        .route("/api/webhooks/printful", post(webhooks::printful))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response, header};

    use crate::config::ServerConfig;
    use crate::db::test_support::test_pool;
    use crate::state::AppState;

    /// Config with every integration disabled.
    pub fn bare_config() -> ServerConfig {
        ServerConfig {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            allowed_origin: None,
            groq: None,
            stripe: None,
            printful: None,
            supabase: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// A router over a fresh in-memory database.
    pub async fn test_app(config: ServerConfig) -> (Router, AppState) {
        let pool = test_pool().await;
        let state = AppState::new(config, pool).unwrap();
        (super::routes().with_state(state.clone()), state)
    }

    /// Build a JSON POST request.
    pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Read a response body as JSON.
    pub async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
