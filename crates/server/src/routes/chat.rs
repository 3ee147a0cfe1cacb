//! Coaching chat endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::CoachService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// `POST /api/chat`
///
/// Validation failures are the only error path; once the request is
/// well-formed the coach always produces a reply.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let user_id = req.user_id.trim();
    let message = req.message.trim();

    if user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }
    if message.is_empty() {
        return Err(AppError::BadRequest("message is required".to_string()));
    }

    let coach = CoachService::new(state.pool(), state.groq(), state.mirror());
    let reply = coach.generate_reply(user_id, message).await;

    Ok(Json(ChatResponse { reply }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::{bare_config, json_body, json_post, test_app};

    #[tokio::test]
    async fn test_chat_replies_200() {
        let (app, _state) = test_app(bare_config()).await;

        let response = app
            .oneshot(json_post(
                "/api/chat",
                json!({"user_id": "u1", "message": "hi"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["reply"].as_str().unwrap().contains("Welcome"));
    }

    #[tokio::test]
    async fn test_chat_empty_message_is_400() {
        let (app, _state) = test_app(bare_config()).await;

        let response = app
            .oneshot(json_post(
                "/api/chat",
                json!({"user_id": "u1", "message": "   "}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Bad request: message is required");
    }

    #[tokio::test]
    async fn test_chat_missing_user_id_is_400() {
        let (app, _state) = test_app(bare_config()).await;

        let response = app
            .oneshot(json_post(
                "/api/chat",
                json!({"user_id": "", "message": "hi"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
