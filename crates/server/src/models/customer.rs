//! Paying customers and their t-shirt fulfillment orders.

use chrono::{DateTime, Utc};
use serde::Serialize;

use willpower_core::{CustomerId, Email, MembershipStatus, OrderStatus, Price, TshirtOrderId};

/// A paying member, keyed by email.
///
/// Created and updated by the Stripe webhook handler; the email is the
/// upsert key so replayed `checkout.session.completed` events are
/// idempotent.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Email,
    pub name: Option<String>,
    /// Stripe subscription ID (sub_...), if the checkout created one.
    pub stripe_subscription_id: Option<String>,
    pub status: MembershipStatus,
    /// Monthly subscription price.
    pub monthly_amount: Price,
    /// Fitness goals collected in checkout custom fields.
    pub fitness_goals: Option<String>,
    /// Experience level collected in checkout custom fields.
    pub experience_level: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Whether this customer currently has membership access.
    #[must_use]
    pub const fn is_member(&self) -> bool {
        self.status.is_member()
    }
}

/// A free t-shirt order created when a checkout includes a size and
/// shipping address.
#[derive(Debug, Clone, Serialize)]
pub struct TshirtOrder {
    pub id: TshirtOrderId,
    pub customer_email: Email,
    /// Shirt size as entered at checkout (S, M, L, XL, XXL).
    pub size: String,
    /// Free-form shipping address as entered at checkout.
    pub shipping_address: String,
    pub status: OrderStatus,
    /// Printful order ID once the order is accepted by Printful.
    pub printful_order_id: Option<String>,
    /// Carrier tracking number once shipped.
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
