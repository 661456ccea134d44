//! Agent module - the tool-using reasoning loop.
//!
//! The agent follows a "reason, act, observe" pattern:
//! 1. Ask the LLM for a thought plus either an action or a final answer
//! 2. If it picked an action, run the tool and record the observation
//! 3. Feed the transcript back and repeat
//! 4. Stop on a final answer, too many malformed outputs, or the iteration limit

mod agent_loop;
pub mod parser;
mod prompt;

pub use agent_loop::{Agent, AgentOutcome, StopReason, ITERATION_LIMIT_MESSAGE};
pub use parser::{parse_agent_output, AgentDecision, ParseError};
pub use prompt::build_agent_prompt;

use crate::tools::ToolName;

/// One iteration of the agent loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStep {
    /// Raw model output for this iteration
    pub log: String,
    /// Reasoning text preceding the action
    pub thought: String,
    /// Tool chosen, if the output parsed
    pub action: Option<ToolName>,
    /// Input passed to the tool
    pub action_input: Option<String>,
    /// Tool result, tool failure, or parse error feedback
    pub observation: Option<String>,
}
