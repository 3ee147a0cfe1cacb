//! Groq chat completions client for AI coaching replies.
//!
//! Groq exposes an OpenAI-compatible API; the backend uses the
//! `/openai/v1/chat/completions` endpoint with a Llama model.

mod client;
mod error;
mod types;

pub use client::GroqClient;
pub use error::GroqError;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role};
