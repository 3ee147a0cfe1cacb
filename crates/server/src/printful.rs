//! Printful API client for t-shirt fulfillment.
//!
//! New members get a free branded t-shirt; when a checkout includes a
//! size and shipping address, an order is submitted to Printful as a
//! draft via `POST /orders`.
//!
//! # API Reference
//!
//! - Base URL: `https://api.printful.com`
//! - Authentication: `Authorization: Bearer <key>`

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::PrintfulConfig;

/// Print file for the member t-shirt front.
const TSHIRT_DESIGN_URL: &str = "https://willpowerfitness.app/assets/tshirt-front.png";

/// Errors that can occur when interacting with the Printful API.
#[derive(Debug, Error)]
pub enum PrintfulError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Printful catalog variant ID for a shirt size.
///
/// Unknown sizes fall back to M.
#[must_use]
pub fn variant_for_size(size: &str) -> i64 {
    match size.trim().to_ascii_uppercase().as_str() {
        "S" => 4011,
        "L" => 4013,
        "XL" => 4014,
        "XXL" => 4015,
        _ => 4012, // M
    }
}

/// A parsed shipping recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub name: String,
    pub address1: String,
    pub city: String,
    pub state_code: String,
    pub country_code: String,
    pub zip: String,
}

/// Parse a free-form shipping address into a Printful recipient.
///
/// The first line becomes the street address; the last line is matched
/// against `City, ST 12345`. Addresses that don't match get a
/// placeholder city so the order still submits and can be corrected in
/// the Printful dashboard before confirmation.
#[must_use]
pub fn parse_shipping_address(name: &str, shipping_address: &str) -> Recipient {
    let lines: Vec<&str> = shipping_address
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let address1 = lines.first().copied().unwrap_or_default().to_string();
    let last_line = lines.last().copied().unwrap_or_default();

    let (city, state_code, zip) = Regex::new(r"(.+?),?\s+([A-Z]{2})\s+(\d{5})")
        .ok()
        .and_then(|re| {
            re.captures(last_line).map(|caps| {
                (
                    caps[1].trim_end_matches(',').trim().to_string(),
                    caps[2].to_string(),
                    caps[3].to_string(),
                )
            })
        })
        .unwrap_or_else(|| {
            (
                "Los Angeles".to_string(),
                "CA".to_string(),
                "90210".to_string(),
            )
        });

    Recipient {
        name: name.to_string(),
        address1,
        city,
        state_code,
        country_code: "US".to_string(),
        zip,
    }
}

#[derive(Serialize)]
struct OrderRequest {
    external_id: String,
    shipping: &'static str,
    recipient: Recipient,
    items: Vec<OrderItem>,
}

#[derive(Serialize)]
struct OrderItem {
    variant_id: i64,
    quantity: u32,
    files: Vec<OrderFile>,
}

#[derive(Serialize)]
struct OrderFile {
    url: &'static str,
}

#[derive(Deserialize)]
struct OrderResponse {
    result: OrderResult,
}

#[derive(Deserialize)]
struct OrderResult {
    id: i64,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    result: String,
}

/// Printful API client.
#[derive(Clone)]
pub struct PrintfulClient {
    inner: Arc<PrintfulClientInner>,
}

struct PrintfulClientInner {
    client: reqwest::Client,
    api_url: String,
}

impl PrintfulClient {
    /// Create a new Printful client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key contains invalid header characters
    /// or the HTTP client fails to build.
    pub fn new(config: &PrintfulConfig) -> Result<Self, PrintfulError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| PrintfulError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(PrintfulClientInner {
                client,
                api_url: config.api_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Submit a draft t-shirt order and return the Printful order ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Printful rejects the order.
    #[instrument(skip(self, shipping_address), fields(size = %size))]
    pub async fn create_tshirt_order(
        &self,
        customer_name: &str,
        customer_email: &str,
        size: &str,
        shipping_address: &str,
    ) -> Result<String, PrintfulError> {
        let request = OrderRequest {
            external_id: format!(
                "willpower_{}_{}",
                customer_email,
                Utc::now().format("%Y%m%d%H%M%S")
            ),
            shipping: "STANDARD",
            recipient: parse_shipping_address(customer_name, shipping_address),
            items: vec![OrderItem {
                variant_id: variant_for_size(size),
                quantity: 1,
                files: vec![OrderFile {
                    url: TSHIRT_DESIGN_URL,
                }],
            }],
        };

        let url = format!("{}/orders", self.inner.api_url);
        let response = self.inner.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                serde_json::from_str::<ApiErrorResponse>(&body).map_or(body, |e| e.result);
            return Err(PrintfulError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OrderResponse = response
            .json()
            .await
            .map_err(|e| PrintfulError::Parse(format!("Failed to parse response: {e}")))?;

        Ok(parsed.result.id.to_string())
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

    #[test]
    fn test_variant_for_size() {
        assert_eq!(variant_for_size("S"), 4011);
        assert_eq!(variant_for_size("m"), 4012);
        assert_eq!(variant_for_size("L"), 4013);
        assert_eq!(variant_for_size(" XL "), 4014);
        assert_eq!(variant_for_size("XXL"), 4015);
        // Unknown sizes fall back to M
        assert_eq!(variant_for_size("XS"), 4012);
    }

    #[test]
    fn test_parse_multiline_address() {
        let recipient =
            parse_shipping_address("Bob Smith", "123 Main St\nApt 4\nAustin, TX 78701");

        assert_eq!(recipient.address1, "123 Main St");
        assert_eq!(recipient.city, "Austin");
        assert_eq!(recipient.state_code, "TX");
        assert_eq!(recipient.zip, "78701");
        assert_eq!(recipient.country_code, "US");
    }

    #[test]
    fn test_parse_city_without_comma() {
        let recipient = parse_shipping_address("Bob", "5 Oak Ave\nNew York NY 10001");

        assert_eq!(recipient.city, "New York");
        assert_eq!(recipient.state_code, "NY");
        assert_eq!(recipient.zip, "10001");
    }

    #[test]
    fn test_parse_unmatchable_address_uses_placeholder() {
        let recipient = parse_shipping_address("Bob", "somewhere nice");

        assert_eq!(recipient.address1, "somewhere nice");
        assert_eq!(recipient.city, "Los Angeles");
        assert_eq!(recipient.state_code, "CA");
        assert_eq!(recipient.zip, "90210");
    }

    fn test_config(server: &MockServer) -> PrintfulConfig {
        PrintfulConfig {
            api_key: SecretString::from("pf_test_key"),
            api_url: server.uri(),
        }
    }

    #[tokio::test]
    async fn test_create_order_returns_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(header("authorization", "Bearer pf_test_key"))
            .and(body_partial_json(json!({
                "shipping": "STANDARD",
                "items": [{"variant_id": 4013, "quantity": 1}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "result": {"id": 987654, "status": "draft"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = PrintfulClient::new(&test_config(&server)).unwrap();
        let order_id = client
            .create_tshirt_order("Bob", "bob@example.com", "L", "123 Main St\nAustin, TX 78701")
            .await
            .unwrap();

        assert_eq!(order_id, "987654");
    }

    #[tokio::test]
    async fn test_create_order_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 400,
                "result": "Invalid variant"
            })))
            .mount(&server)
            .await;

        let client = PrintfulClient::new(&test_config(&server)).unwrap();
        let err = client
            .create_tshirt_order("Bob", "bob@example.com", "L", "addr")
            .await
            .unwrap_err();

        match err {
            PrintfulError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid variant");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
