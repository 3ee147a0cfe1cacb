//! Stripe webhook handling.
//!
//! No SDK: the backend only consumes webhooks and hands out a hosted
//! payment link, so all that is needed is signature verification
//! (`Stripe-Signature` v1 scheme, HMAC-SHA256) and payload types for
//! the events we care about.

mod signature;
mod types;

pub use signature::{SignatureError, construct_event, verify_signature};
pub use types::{CheckoutSession, CustomerDetails, Subscription, WebhookEvent};
