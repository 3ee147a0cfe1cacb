//! Knowledge base entries spliced into coaching prompts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use willpower_core::KnowledgeItemId;

/// A Q&A pair used to ground AI replies in business facts
/// (pricing, policies, program details).
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeItem {
    pub id: KnowledgeItemId,
    pub topic: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    /// Where the entry came from (manual seeding today).
    pub source: String,
    pub created_at: DateTime<Utc>,
}
