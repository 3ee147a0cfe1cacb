//! The reply generator behind the chat and lead-capture endpoints.
//!
//! Ties together context loading, funnel stage selection, the Groq API
//! and persistence. The cardinal rule: the user always gets a reply.
//! Missing credentials, upstream failures and persistence errors all
//! degrade to scripted text; nothing on this path propagates an error
//! to the HTTP layer.

use sqlx::SqlitePool;
use tracing::{instrument, warn};

use willpower_core::MessageRole;

use crate::db::{KnowledgeRepository, MessageRepository, RepositoryError, UserRepository};
use crate::groq::{ChatMessage, GroqClient};
use crate::services::funnel::{self, ConversationContext, FunnelStage};
use crate::services::mirror::MirrorClient;

/// How much history is loaded for context (the prompt builder trims
/// further).
const HISTORY_LIMIT: i64 = 50;

/// How many knowledge base hits are spliced into the system prompt.
const KNOWLEDGE_LIMIT: i64 = 3;

/// Coaching reply generator.
pub struct CoachService<'a> {
    pool: &'a SqlitePool,
    groq: Option<&'a GroqClient>,
    mirror: Option<&'a MirrorClient>,
}

impl<'a> CoachService<'a> {
    /// Create a new coach service.
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        groq: Option<&'a GroqClient>,
        mirror: Option<&'a MirrorClient>,
    ) -> Self {
        Self { pool, groq, mirror }
    }

    /// Load a user's conversation context.
    ///
    /// Unknown users get defaults ("Friend", "your fitness goals", empty
    /// history) rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a query fails.
    pub async fn load_context(&self, user_id: &str) -> Result<ConversationContext, RepositoryError> {
        let user = UserRepository::new(self.pool).get(user_id).await?;
        let history = MessageRepository::new(self.pool)
            .recent_history(user_id, HISTORY_LIMIT)
            .await?;

        Ok(match user {
            Some(user) => ConversationContext {
                name: user.name,
                goal: user.goal,
                source: user.source,
                history,
            },
            None => ConversationContext {
                history,
                ..ConversationContext::default()
            },
        })
    }

    /// Generate a coaching reply to an inbound message.
    ///
    /// Persists both turns, mirrors them best-effort, and always returns
    /// some reply text.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn generate_reply(&self, user_id: &str, input: &str) -> String {
        let messages = MessageRepository::new(self.pool);

        let prior_user_messages = match messages.count_user_messages(user_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to count prior messages, assuming first message");
                0
            }
        };
        let stage = funnel::select_stage(prior_user_messages, input);

        let ctx = match self.load_context(user_id).await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "Failed to load conversation context, using defaults");
                ConversationContext::default()
            }
        };

        if let Err(e) = messages.add(user_id, MessageRole::User, input).await {
            warn!(error = %e, "Failed to persist inbound message");
        }

        let reply = match self.groq {
            Some(groq) => {
                let mut prompt = funnel::build_prompt(stage, &ctx, input);
                self.splice_knowledge(&mut prompt, input).await;

                match groq.chat(prompt).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!(error = %e, ?stage, "Chat API failed, falling back to script");
                        fallback_reply(stage, &ctx, input)
                    }
                }
            }
            None => funnel::scripted_reply(stage, &ctx),
        };

        if let Err(e) = messages.add(user_id, MessageRole::Assistant, &reply).await {
            warn!(error = %e, "Failed to persist assistant reply");
        }

        if let Some(mirror) = self.mirror {
            mirror.log_conversation_detached(user_id, input, &reply);
        }

        reply
    }

    /// Generate the personalized first response for a captured lead.
    ///
    /// Same degradation rules as [`generate_reply`](Self::generate_reply):
    /// a scripted response when the chat API is missing or failing.
    #[instrument(skip(self, goals, message))]
    pub async fn lead_response(
        &self,
        name: &str,
        goals: Option<&str>,
        experience: Option<&str>,
        message: Option<&str>,
    ) -> String {
        let goals_text = goals.unwrap_or("getting in the best shape of your life");

        if let Some(groq) = self.groq {
            let system = format!(
                "You are Will Power, the AI personal trainer behind Willpower Fitness. \
                 A new lead named {name} just reached out. Their goals: {goals_text}. \
                 Experience level: {exp}. Write a short, energetic personal response \
                 that speaks to their goals and invites them to start membership \
                 ($225/month, includes a free t-shirt). No full program advice.",
                exp = experience.unwrap_or("unknown"),
            );
            let user_message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or("I'm interested in coaching.");

            match groq
                .chat(vec![
                    ChatMessage::system(system),
                    ChatMessage::user(user_message),
                ])
                .await
            {
                Ok(reply) => return reply,
                Err(e) => warn!(error = %e, "Chat API failed for lead response"),
            }
        }

        format!(
            "Hi {name}! I'm Will Power, your AI personal trainer. I love that you're \
             focused on {goals_text} - that's exactly the kind of goal we crush here at \
             Willpower Fitness. You're one click away from 24/7 coaching, a plan built \
             around you, and a free t-shirt to start. Let's get to work!"
        )
    }

    /// Append knowledge base hits to the system prompt.
    ///
    /// Search failures are logged and skipped; replies still work
    /// without grounding.
    async fn splice_knowledge(&self, prompt: &mut [ChatMessage], input: &str) {
        let hits = match KnowledgeRepository::new(self.pool)
            .search(input, KNOWLEDGE_LIMIT)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Knowledge base search failed");
                return;
            }
        };

        if hits.is_empty() {
            return;
        }

        if let Some(system) = prompt.first_mut() {
            system.content.push_str("\n\nRELEVANT KNOWLEDGE:");
            for hit in hits {
                system
                    .content
                    .push_str(&format!("\nQ: {}\nA: {}", hit.question, hit.answer));
            }
        }
    }
}

/// Fallback reply when the chat API fails mid-request.
///
/// Re-checks purchase intent so even an API outage keeps the sales
/// funnel moving instead of apologizing to a ready buyer.
fn fallback_reply(stage: FunnelStage, ctx: &ConversationContext, input: &str) -> String {
    if funnel::has_purchase_intent(input) {
        funnel::scripted_reply(FunnelStage::SubscriptionIntent, ctx)
    } else {
        funnel::scripted_reply(stage, ctx)
    }
}
