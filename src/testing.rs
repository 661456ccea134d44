//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{CompletionError, LlmClient};
use crate::tools::{KnowledgeLookup, LookupError};

/// LLM that replays canned replies and records every prompt.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    /// Reply with `replies` in order, then fail with `EmptyResponse`.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            repeat: None,
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply with the same text forever.
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            repeat: Some(reply.into()),
            ..Self::new(Vec::<String>::new())
        }
    }

    /// Fail every call with `RateLimited`.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::<String>::new())
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str, _stop: &[&str]) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(CompletionError::RateLimited);
        }
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return Ok(reply);
        }
        self.repeat.clone().ok_or(CompletionError::EmptyResponse)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Lookup that returns one fixed summary (or always fails) and records queries.
pub struct FakeLookup {
    answer: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeLookup for FakeLookup {
    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.answer
            .clone()
            .ok_or_else(|| LookupError::Http("connection refused".to_string()))
    }
}
