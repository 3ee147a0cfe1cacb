//! Webhook endpoints for Stripe and Printful.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::services::MembershipService;
use crate::state::AppState;
use crate::stripe::{SignatureError, construct_event};

/// `POST /api/webhooks/stripe`
///
/// Takes the raw body because signature verification covers the exact
/// bytes Stripe sent; any re-serialization would break it.
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let config = state
        .config()
        .stripe
        .as_ref()
        .ok_or(AppError::NotConfigured("payments"))?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::WebhookSignature(SignatureError::MalformedHeader))?;

    let event = construct_event(&body, signature, config.webhook_secret.expose_secret())?;

    MembershipService::new(state.pool(), state.printful())
        .handle_event(&event)
        .await?;

    Ok(Json(json!({ "received": true })))
}

#[derive(Debug, Deserialize)]
pub struct PrintfulWebhook {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: PrintfulWebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrintfulWebhookData {
    #[serde(default)]
    pub order: Option<PrintfulWebhookOrder>,
    #[serde(default)]
    pub shipment: Option<PrintfulWebhookShipment>,
}

#[derive(Debug, Deserialize)]
pub struct PrintfulWebhookOrder {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PrintfulWebhookShipment {
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// `POST /api/webhooks/printful`
///
/// Printful calls back when a package ships; we record the tracking
/// number against the matching order. Other event types are ignored.
pub async fn printful(
    State(state): State<AppState>,
    Json(webhook): Json<PrintfulWebhook>,
) -> Result<Json<Value>> {
    if webhook.event_type == "package_shipped" {
        let Some(order) = webhook.data.order else {
            warn!("package_shipped webhook without an order");
            return Ok(Json(json!({ "received": true })));
        };
        let tracking = webhook
            .data
            .shipment
            .as_ref()
            .and_then(|s| s.tracking_number.as_deref());

        let updated = OrderRepository::new(state.pool())
            .mark_shipped(&order.id.to_string(), tracking)
            .await?;
        if updated.is_none() {
            warn!(printful_order_id = order.id, "Shipment for unknown order");
        }
    }

    Ok(Json(json!({ "received": true })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use hmac::{Hmac, Mac};
    use secrecy::SecretString;
    use serde_json::json;
    use sha2::Sha256;
    use tower::ServiceExt;

    use willpower_core::{Email, MembershipStatus, OrderStatus};

    use crate::config::StripeConfig;
    use crate::db::{CustomerRepository, OrderRepository};
    use crate::routes::test_support::{bare_config, json_body, json_post, test_app};

    const SECRET: &str = "whsec_test_secret";

    fn stripe_config() -> StripeConfig {
        StripeConfig {
            webhook_secret: SecretString::from(SECRET),
            payment_link: "https://buy.stripe.com/test".to_string(),
        }
    }

    fn signed_request(payload: &str) -> Request<Body> {
        let timestamp = chrono::Utc::now().timestamp();
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/webhooks/stripe")
            .header(header::CONTENT_TYPE, "application/json")
            .header("stripe-signature", format!("t={timestamp},v1={sig}"))
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_stripe_checkout_completed_activates_member() {
        let mut config = bare_config();
        config.stripe = Some(stripe_config());
        let (app, state) = test_app(config).await;

        let payload = json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "customer_details": {"email": "bob@example.com", "name": "Bob"},
                "subscription": "sub_123",
                "custom_fields": []
            }}
        })
        .to_string();

        let response = app.oneshot(signed_request(&payload)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["received"], true);

        let email = Email::parse("bob@example.com").unwrap();
        let customer = CustomerRepository::new(state.pool())
            .get_by_email(&email)
            .await
            .unwrap()
            .expect("customer should exist");
        assert_eq!(customer.status, MembershipStatus::Active);
    }

    #[tokio::test]
    async fn test_stripe_bad_signature_is_400() {
        let mut config = bare_config();
        config.stripe = Some(stripe_config());
        let (app, _state) = test_app(config).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/webhooks/stripe")
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                "stripe-signature",
                format!("t={},v1={}", chrono::Utc::now().timestamp(), "ab".repeat(32)),
            )
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stripe_missing_header_is_400() {
        let mut config = bare_config();
        config.stripe = Some(stripe_config());
        let (app, _state) = test_app(config).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/webhooks/stripe")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stripe_unconfigured_is_503() {
        let (app, _state) = test_app(bare_config()).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/webhooks/stripe")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_printful_package_shipped_records_tracking() {
        let (app, state) = test_app(bare_config()).await;
        let email = Email::parse("bob@example.com").unwrap();

        let orders = OrderRepository::new(state.pool());
        let order = orders.create(&email, "L", "123 Main St").await.unwrap();
        orders.mark_sent(order.id, "555").await.unwrap();

        let response = app
            .oneshot(json_post(
                "/api/webhooks/printful",
                json!({
                    "type": "package_shipped",
                    "data": {
                        "order": {"id": 555},
                        "shipment": {"tracking_number": "9400111899560000000000"}
                    }
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let updated = orders.list_for_customer(&email).await.unwrap();
        assert_eq!(updated[0].status, OrderStatus::Shipped);
        assert_eq!(
            updated[0].tracking_number.as_deref(),
            Some("9400111899560000000000")
        );
    }

    #[tokio::test]
    async fn test_printful_other_events_acknowledged() {
        let (app, _state) = test_app(bare_config()).await;

        let response = app
            .oneshot(json_post(
                "/api/webhooks/printful",
                json!({"type": "order_created", "data": {}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
