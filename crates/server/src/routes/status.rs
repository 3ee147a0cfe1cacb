//! Service status endpoint.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// Which integrations are live, for quick deploy sanity checks.
    pub integrations: Integrations,
}

#[derive(Debug, Serialize)]
pub struct Integrations {
    pub groq: bool,
    pub stripe: bool,
    pub printful: bool,
    pub supabase: bool,
}

/// `GET /api/status`
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let config = state.config();

    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        integrations: Integrations {
            groq: config.groq.is_some(),
            stripe: config.stripe.is_some(),
            printful: config.printful.is_some(),
            supabase: config.supabase.is_some(),
        },
    })
}
