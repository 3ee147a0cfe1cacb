//! Stripe webhook signature verification.
//!
//! Stripe signs webhook payloads with HMAC-SHA256 over
//! `"{timestamp}.{payload}"` and sends the result in the
//! `Stripe-Signature` header as `t=<unix>,v1=<hex>[,v1=<hex>...]`.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age of a signed payload, in seconds.
///
/// Matches Stripe's recommended replay-protection tolerance.
const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Errors from webhook signature verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Header is missing the timestamp or any v1 signature.
    #[error("Malformed Stripe-Signature header")]
    MalformedHeader,

    /// No v1 signature matched the expected HMAC.
    #[error("Signature mismatch")]
    Mismatch,

    /// The signed timestamp is outside the replay tolerance window.
    #[error("Timestamp outside tolerance window")]
    TimestampOutOfTolerance,

    /// The verified payload failed to parse as a webhook event.
    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),
}

/// Verify a `Stripe-Signature` header against a payload.
///
/// `now` is injected so the tolerance window is testable.
///
/// # Errors
///
/// Returns an error if the header is malformed, the timestamp is stale,
/// or no signature matches.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    candidates.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if candidates.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    if (now.timestamp() - timestamp).abs() > DEFAULT_TOLERANCE_SECS {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    for candidate in &candidates {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::MalformedHeader)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        // verify_slice is constant-time
        if mac.verify_slice(candidate).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

/// Verify a webhook payload and parse it into an event.
///
/// # Errors
///
/// Returns an error if verification fails or the payload is not a
/// well-formed event.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
) -> Result<super::WebhookEvent, SignatureError> {
    verify_signature(payload, header, secret, Utc::now())?;
    serde_json::from_slice(payload).map_err(|e| SignatureError::InvalidPayload(e.to_string()))
}
