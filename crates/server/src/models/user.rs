//! Chat users and their conversation messages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use willpower_core::{Email, MessageId, MessageRole, UserId};

/// A chat user created during onboarding.
///
/// `user_id` is the client-supplied opaque identifier (browser session,
/// app install, etc.); `id` is the database rowid.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    /// Client-supplied opaque identifier, unique per user.
    pub user_id: String,
    /// Display name used in prompts and scripted replies.
    pub name: String,
    pub email: Option<Email>,
    /// Stated fitness goal from onboarding.
    pub goal: String,
    /// Acquisition source (defaults to "website").
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One turn of a conversation, either side.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub user_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
