//! Sales funnel stage selection and prompt/script templates.
//!
//! The coaching persona ("Will Power") follows a scripted funnel: an
//! enthusiastic introduction, a structured second response, then
//! steady-state coaching that withholds complete programs until the
//! user becomes a member. Purchase-intent keywords short-circuit
//! everything into a call to action.
//!
//! Stage selection is a pure function of (prior user message count,
//! keyword containment) so it can be tested without any I/O.

use crate::groq::ChatMessage;
use crate::models::Message;

/// Keywords that signal purchase intent, checked as lowercase substrings.
pub const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    "subscribe",
    "sign up",
    "join",
    "purchase",
    "buy",
    "pay",
    "membership",
    "what do i do",
    "next step",
    "how do i",
    "ready to",
];

/// How many history turns are replayed to the model in steady state.
const HISTORY_WINDOW: usize = 10;

/// Fixed call to action naming the purchase button on the chat page.
pub const CTA_SCRIPT: &str = "To become a Willpower Fitness member, simply click the BUY NOW \
     button that says '$225/MONTH + FREE T-SHIRT' on this page. Once you complete your \
     purchase, you'll have 24/7 access to me as your personal AI trainer!";

/// Generic apology used when the chat API is unreachable mid-conversation.
pub const APOLOGY_SCRIPT: &str =
    "Sorry, I'm having trouble connecting right now. Please try again!";

/// Which response strategy applies to an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunnelStage {
    /// The message contains a purchase keyword; push the call to action.
    SubscriptionIntent,
    /// The user's very first message; enthusiastic introduction.
    FirstMessage,
    /// The second message; stricter fixed-format response.
    SecondMessage,
    /// Everything after; general coaching.
    Ongoing,
}

/// What the reply generator needs to know about a user.
///
/// Unknown users get friendly defaults rather than an error, so the
/// chat endpoint works even before onboarding completes.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub name: String,
    pub goal: String,
    pub source: String,
    /// Prior turns, oldest first.
    pub history: Vec<Message>,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self {
            name: "Friend".to_string(),
            goal: "your fitness goals".to_string(),
            source: "website".to_string(),
            history: Vec::new(),
        }
    }
}

/// Whether a message contains a purchase-intent keyword.
///
/// Plain substring containment on the lowercased input; false positives
/// ("I bought new shoes") are an accepted limitation.
#[must_use]
pub fn has_purchase_intent(input: &str) -> bool {
    let lower = input.to_lowercase();
    SUBSCRIPTION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Select the funnel stage for an inbound message.
///
/// `prior_user_messages` counts only messages the user sent before this
/// one. Purchase intent overrides the stage count, even on the very
/// first message.
#[must_use]
pub fn select_stage(prior_user_messages: i64, input: &str) -> FunnelStage {
    if has_purchase_intent(input) {
        return FunnelStage::SubscriptionIntent;
    }
    match prior_user_messages {
        0 => FunnelStage::FirstMessage,
        1 => FunnelStage::SecondMessage,
        _ => FunnelStage::Ongoing,
    }
}

/// The base coaching persona, parameterized by the user's profile.
fn persona(ctx: &ConversationContext) -> String {
    format!(
        "You are Will Power, the AI personal trainer behind Willpower Fitness. \
         You are coaching {name}, who found us via {source} and whose goal is: {goal}. \
         Be energetic, direct and encouraging. Keep replies short and conversational. \
         Never give out a complete training or nutrition program - full programs are \
         reserved for members ($225/month, includes a free t-shirt).",
        name = ctx.name,
        source = ctx.source,
        goal = ctx.goal,
    )
}

/// Build the message list sent to the chat API for a given stage.
///
/// Steady state replays up to the last [`HISTORY_WINDOW`] turns; the
/// scripted stages rely on the system prompt alone.
#[must_use]
pub fn build_prompt(
    stage: FunnelStage,
    ctx: &ConversationContext,
    input: &str,
) -> Vec<ChatMessage> {
    let mut system = persona(ctx);

    match stage {
        FunnelStage::SubscriptionIntent => {
            system.push_str(&format!(
                "\n\nThe user is ready to sign up. Respond with enthusiasm and tell them: {CTA_SCRIPT}"
            ));
        }
        FunnelStage::FirstMessage => {
            system.push_str(&format!(
                "\n\nThis is {name}'s first message. Welcome them warmly, echo their goal \
                 back to them, and present exactly four numbered focus areas (training, \
                 nutrition, recovery, accountability) as open-ended questions. Close by \
                 asking which one they want to start with.",
                name = ctx.name,
            ));
        }
        FunnelStage::SecondMessage => {
            system.push_str(&format!(
                "\n\nThis is {name}'s second message. Open with exactly: \
                 \"{name} I hear you and understand\". Then give four numbered focus \
                 bullets tied to their goal. Close with exactly: \
                 \"Access is key. Accountability is the price. Following-through opens the door.\"",
                name = ctx.name,
            ));
        }
        FunnelStage::Ongoing => {
            system.push_str(
                "\n\nContinue the coaching conversation. Answer what you can, but steer \
                 toward membership when they ask for a full program.",
            );
        }
    }

    let mut messages = vec![ChatMessage::system(system)];

    if stage == FunnelStage::Ongoing {
        let start = ctx.history.len().saturating_sub(HISTORY_WINDOW);
        for turn in &ctx.history[start..] {
            messages.push(ChatMessage {
                role: turn.role.into(),
                content: turn.content.clone(),
            });
        }
    }

    messages.push(ChatMessage::user(input));
    messages
}

/// Scripted reply for a stage, used when the chat API is unconfigured
/// or fails. Keeps the funnel moving without the model.
#[must_use]
pub fn scripted_reply(stage: FunnelStage, ctx: &ConversationContext) -> String {
    match stage {
        FunnelStage::SubscriptionIntent => {
            format!("Great {name}! {CTA_SCRIPT}", name = ctx.name)
        }
        FunnelStage::FirstMessage => format!(
            "Welcome to Willpower Fitness, {name}! I'm Will Power, your personal AI \
             trainer, and I'm fired up to help you with {goal}. Let's figure out where \
             to start:\n\n\
             1. Training - what does your current routine look like?\n\
             2. Nutrition - how are you fueling your body day to day?\n\
             3. Recovery - how is your sleep and stress?\n\
             4. Accountability - what's kept you from {goal} so far?\n\n\
             Which one do you want to tackle first?",
            name = ctx.name,
            goal = ctx.goal,
        ),
        FunnelStage::SecondMessage => format!(
            "{name} I hear you and understand. Here's where we focus:\n\n\
             1. A clear plan built around {goal}\n\
             2. Habits you can actually keep\n\
             3. Progress you can measure week to week\n\
             4. Someone in your corner every single day\n\n\
             Access is key. Accountability is the price. Following-through opens the door.",
            name = ctx.name,
            goal = ctx.goal,
        ),
        FunnelStage::Ongoing => APOLOGY_SCRIPT.to_string(),
    }
}
