//! Inbound leads captured from the marketing site.

use chrono::{DateTime, Utc};
use serde::Serialize;

use willpower_core::{Email, LeadId, LeadStatus};

/// A prospect who filled out the lead capture form.
///
/// Upserted by email so repeat submissions refresh the record instead
/// of erroring.
#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub id: LeadId,
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
    pub goals: Option<String>,
    pub experience: Option<String>,
    /// The message the lead submitted with the form, if any.
    pub initial_message: Option<String>,
    /// The AI-personalized response we sent back.
    pub ai_response: Option<String>,
    /// Channel the lead arrived through (website, sms, email, marketplace).
    pub source: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}
