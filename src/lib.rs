//! # MathsGPT
//!
//! A chat service that answers math and general-knowledge questions.
//!
//! This library provides:
//! - An HTTP API the browser chat widget talks to
//! - Keyword routing between direct math reasoning and a tool-using agent
//! - A ReAct agent loop with Wikipedia and math-reasoning tools
//! - Integration with Groq's OpenAI-compatible API for LLM access
//!
//! ## Architecture
//!
//! 1. A question arrives for a session
//! 2. The router checks it for math keywords
//! 3. Math questions get one step-by-step reasoning completion
//! 4. Everything else goes through the agent loop until it produces a final answer
//! 5. Both the question and the answer are appended to the session's conversation
//!
//! ## Example
//!
//! ```rust,ignore
//! use mathsgpt::{config::Config, session::{GroqSessionFactory, SessionFactory}};
//!
//! let config = Config::from_env()?;
//! let factory = GroqSessionFactory::new(config);
//! let mut session = factory.create(api_key, None)?;
//! let answer = session.ask("Solve 2x + 3 = 7 for x").await;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod reasoning;
pub mod router;
pub mod session;
pub mod tools;

#[cfg(test)]
mod testing;

pub use config::Config;
