//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::Turn;
use crate::router::RoutingDecision;

/// Request to open a chat session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Groq API key; falls back to the server's key when absent or blank
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional model override (uses default if not specified)
    #[serde(default)]
    pub model: Option<String>,
}

/// Response after creating a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    /// Unique session identifier
    pub id: Uuid,

    /// Model answering in this session
    pub model: String,

    /// Initial conversation (the greeting)
    pub messages: Vec<Turn>,
}

/// Full conversation of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub messages: Vec<Turn>,
}

/// A new user question.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

/// The assistant's reply to a question.
#[derive(Debug, Clone, Serialize)]
pub struct PostMessageResponse {
    /// How the question was answered
    pub route: RoutingDecision,

    /// Assistant turn appended to the conversation
    pub message: Turn,
}

/// Error payload for non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error kind
    pub error: String,

    /// Text safe to show the user
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
