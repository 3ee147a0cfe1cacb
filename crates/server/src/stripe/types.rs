//! Payload types for the Stripe webhook events we handle.
//!
//! Only the fields the membership service reads are modeled; everything
//! else in the event stays in the raw `data.object` JSON.

use serde::Deserialize;
use serde_json::Value;

/// A Stripe webhook event envelope.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

/// The `data` wrapper around the event object.
#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: Value,
}

impl WebhookEvent {
    /// Parse the event object as a checkout session.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the object does not match.
    pub fn checkout_session(&self) -> Result<CheckoutSession, serde_json::Error> {
        CheckoutSession::deserialize(&self.data.object)
    }

    /// Parse the event object as a subscription.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the object does not match.
    pub fn subscription(&self) -> Result<Subscription, serde_json::Error> {
        Subscription::deserialize(&self.data.object)
    }
}

/// A completed checkout session.
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    /// Subscription ID (sub_...) when the checkout created one.
    #[serde(default)]
    pub subscription: Option<String>,
    /// Custom fields configured on the payment link (t-shirt size,
    /// shipping address, fitness goals, experience level).
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

/// Buyer details attached to a checkout session.
#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One payment link custom field.
///
/// Dropdowns and text fields carry their value in differently-shaped
/// sub-objects, so both are modeled and [`CustomField::value`] picks
/// whichever is present.
#[derive(Debug, Deserialize)]
pub struct CustomField {
    pub key: String,
    #[serde(default)]
    pub text: Option<FieldValue>,
    #[serde(default)]
    pub dropdown: Option<FieldValue>,
}

#[derive(Debug, Deserialize)]
pub struct FieldValue {
    #[serde(default)]
    pub value: Option<String>,
}

impl CustomField {
    /// The entered value, from whichever field kind is present.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.dropdown
            .as_ref()
            .or(self.text.as_ref())
            .and_then(|v| v.value.as_deref())
    }
}

impl CheckoutSession {
    /// Look up a custom field value by key.
    #[must_use]
    pub fn custom_field(&self, key: &str) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|f| f.key == key)
            .and_then(CustomField::value)
    }

    /// T-shirt size selected at checkout.
    #[must_use]
    pub fn tshirt_size(&self) -> Option<&str> {
        self.custom_field("tshirt_size")
    }

    /// Shipping address entered at checkout.
    #[must_use]
    pub fn shipping_address(&self) -> Option<&str> {
        self.custom_field("shipping_address")
    }

    /// Fitness goals entered at checkout.
    #[must_use]
    pub fn fitness_goals(&self) -> Option<&str> {
        self.custom_field("fitness_goals")
    }

    /// Experience level selected at checkout.
    #[must_use]
    pub fn experience_level(&self) -> Option<&str> {
        self.custom_field("experience_level")
    }
}

/// A Stripe subscription object.
#[derive(Debug, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
}
