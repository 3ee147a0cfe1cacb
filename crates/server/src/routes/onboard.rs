//! User onboarding endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use willpower_core::Email;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OnboardRequest {
    pub user_id: String,
    pub name: String,
    pub goal: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OnboardResponse {
    pub user_id: String,
    pub message: String,
}

/// `POST /api/onboard`
///
/// Creates or refreshes the user's profile; the returned message is the
/// scripted greeting shown before their first chat message.
pub async fn onboard(
    State(state): State<AppState>,
    Json(req): Json<OnboardRequest>,
) -> Result<Json<OnboardResponse>> {
    let user_id = req.user_id.trim();
    let name = req.name.trim();
    let goal = req.goal.trim();

    if user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if goal.is_empty() {
        return Err(AppError::BadRequest("goal is required".to_string()));
    }

    let email = req
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    let source = req.source.as_deref().unwrap_or("website");

    let user = UserRepository::new(state.pool())
        .upsert(user_id, name, email.as_ref(), goal, source)
        .await?;

    let message = format!(
        "Welcome to Willpower Fitness, {}! I'm Will Power, your personal AI trainer. \
         Your goal: {}. Send me a message whenever you're ready to start.",
        user.name, user.goal,
    );

    Ok(Json(OnboardResponse {
        user_id: user.user_id,
        message,
    }))
}
