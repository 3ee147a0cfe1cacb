//! Membership lookup endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use willpower_core::{Email, MembershipStatus};

use crate::db::CustomerRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MeQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub email: String,
    pub is_member: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MembershipStatus>,
    /// Formatted monthly price, e.g. "$225.00".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_amount: Option<String>,
}

/// `GET /api/me?email=...`
///
/// Unknown emails are not an error; they are simply not members.
pub async fn me(
    State(state): State<AppState>,
    Query(query): Query<MeQuery>,
) -> Result<Json<MeResponse>> {
    let email = Email::parse(&query.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let customer = CustomerRepository::new(state.pool())
        .get_by_email(&email)
        .await?;

    Ok(Json(match customer {
        Some(customer) => MeResponse {
            email: customer.email.to_string(),
            is_member: customer.is_member(),
            status: Some(customer.status),
            monthly_amount: Some(customer.monthly_amount.display()),
        },
        None => MeResponse {
            email: email.to_string(),
            is_member: false,
            status: None,
            monthly_amount: None,
        },
    }))
}
