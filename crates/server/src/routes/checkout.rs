//! Checkout endpoint.
//!
//! Payments run through a hosted Stripe payment link, so "checkout" is
//! just handing that link out; the webhook does the real work.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use willpower_core::Email;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    /// What the buyer said they want, kept for funnel analytics in logs.
    #[serde(default)]
    pub intent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// `POST /api/checkout`
pub async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let email =
        Email::parse(&req.email).map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let stripe = state
        .config()
        .stripe
        .as_ref()
        .ok_or(AppError::NotConfigured("payments"))?;

    tracing::info!(email = %email, intent = ?req.intent, "Checkout link requested");

    Ok(Json(CheckoutResponse {
        url: stripe.payment_link.clone(),
    }))
}
