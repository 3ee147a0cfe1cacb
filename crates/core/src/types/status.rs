//! Status enums and the chat message role.
//!
//! All of these are stored as lowercase `TEXT` columns in SQLite; the
//! `Display`/`FromStr` pairs are the single source of truth for the wire
//! and storage spelling.

use serde::{Deserialize, Serialize};

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("invalid message role: {s}")),
        }
    }
}

/// Subscription status of a paying customer.
///
/// Mirrors the Stripe subscription statuses the webhook handler receives.
/// Unknown upstream statuses map to [`MembershipStatus::Inactive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Active,
    Trialing,
    PastDue,
    Canceled,
    Inactive,
}

impl MembershipStatus {
    /// Whether this status grants membership access.
    ///
    /// `active` and `trialing` count as members; everything else does not.
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }

    /// Map a raw Stripe subscription status string to a membership status.
    #[must_use]
    pub fn from_subscription_status(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "trialing" => Self::Trialing,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            _ => Self::Inactive,
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Trialing => write!(f, "trialing"),
            Self::PastDue => write!(f, "past_due"),
            Self::Canceled => write!(f, "canceled"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "trialing" => Ok(Self::Trialing),
            "past_due" => Ok(Self::PastDue),
            "canceled" => Ok(Self::Canceled),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid membership status: {s}")),
        }
    }
}

/// T-shirt fulfillment order status.
///
/// Lifecycle: `pending` (row created) → `sent` (accepted by the fulfillment
/// provider) → `shipped` (tracking number received).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Sent,
    Shipped,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Sent => write!(f, "sent"),
            Self::Shipped => write!(f, "shipped"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "shipped" => Ok(Self::Shipped),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Lifecycle status of an inbound lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Converted,
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Contacted => write!(f, "contacted"),
            Self::Converted => write!(f, "converted"),
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "converted" => Ok(Self::Converted),
            _ => Err(format!("invalid lead status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let parsed = MessageRole::from_str(&role.to_string()).unwrap();
            assert_eq!(parsed, role);
        }
        assert!(MessageRole::from_str("system").is_err());
    }

    #[test]
    fn test_membership_is_member() {
        assert!(MembershipStatus::Active.is_member());
        assert!(MembershipStatus::Trialing.is_member());
        assert!(!MembershipStatus::PastDue.is_member());
        assert!(!MembershipStatus::Canceled.is_member());
        assert!(!MembershipStatus::Inactive.is_member());
    }

    #[test]
    fn test_membership_from_subscription_status() {
        assert_eq!(
            MembershipStatus::from_subscription_status("trialing"),
            MembershipStatus::Trialing
        );
        assert_eq!(
            MembershipStatus::from_subscription_status("unpaid"),
            MembershipStatus::Inactive
        );
    }

    #[test]
    fn test_order_status_roundtrip() {
        for status in [OrderStatus::Pending, OrderStatus::Sent, OrderStatus::Shipped] {
            let parsed = OrderStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_lead_status_default() {
        assert_eq!(LeadStatus::default(), LeadStatus::New);
    }

    #[test]
    fn test_serde_spelling_matches_display() {
        let json = serde_json::to_string(&MembershipStatus::PastDue).unwrap();
        assert_eq!(json, "\"past_due\"");
        assert_eq!(MembershipStatus::PastDue.to_string(), "past_due");
    }
}
