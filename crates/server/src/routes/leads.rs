//! Lead capture endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use willpower_core::Email;

use crate::db::{LeadRepository, leads::LeadUpsert};
use crate::error::{AppError, Result};
use crate::services::CoachService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeadCaptureRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Channel the lead came through (website, sms, email, marketplace).
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "website".to_string()
}

#[derive(Debug, Serialize)]
pub struct LeadCaptureResponse {
    pub ai_response: String,
    /// Hosted payment link, when payments are configured.
    pub payment_link: Option<String>,
}

/// `POST /api/lead-capture`
///
/// Stores the lead and replies with an AI-personalized response plus
/// the payment link so the marketing page can present both at once.
pub async fn capture(
    State(state): State<AppState>,
    Json(req): Json<LeadCaptureRequest>,
) -> Result<Json<LeadCaptureResponse>> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    let email = Email::parse(&req.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let coach = CoachService::new(state.pool(), state.groq(), state.mirror());
    let ai_response = coach
        .lead_response(
            name,
            req.goals.as_deref(),
            req.experience.as_deref(),
            req.message.as_deref(),
        )
        .await;

    LeadRepository::new(state.pool())
        .upsert(LeadUpsert {
            email: &email,
            name,
            phone: req.phone.as_deref(),
            goals: req.goals.as_deref(),
            experience: req.experience.as_deref(),
            initial_message: req.message.as_deref(),
            ai_response: Some(&ai_response),
            source: &req.source,
        })
        .await?;

    let payment_link = state
        .config()
        .stripe
        .as_ref()
        .map(|s| s.payment_link.clone());

    Ok(Json(LeadCaptureResponse {
        ai_response,
        payment_link,
    }))
}
