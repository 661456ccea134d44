//! LLM client abstraction.
//!
//! The reasoning collaborator is reached through [`LlmClient`]. The production
//! implementation talks to Groq's OpenAI-compatible chat completions API; tests
//! plug in scripted clients.

mod groq;

pub use groq::GroqClient;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Failure of the reasoning collaborator.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("LLM request timed out")]
    Timeout,

    #[error("LLM rejected the API key")]
    Unauthorized,

    #[error("LLM rate limit or quota exceeded")]
    RateLimited,

    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("LLM request failed: {0}")]
    Transport(String),
}

/// Message role in a chat completion request. Prompts are always sent as a
/// single user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single chat completion message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Text completion against a hosted model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `prompt` as a single user message and return the raw text reply.
    ///
    /// Generation stops before any of the `stop` sequences.
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, CompletionError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}
