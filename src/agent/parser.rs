//! Parser for ReAct-formatted model output.
//!
//! The model is asked to answer with either
//!
//! ```text
//! Thought: ...
//! Action: <tool name>
//! Action Input: <input>
//! ```
//!
//! or
//!
//! ```text
//! Thought: I now know the final answer
//! Final Answer: <answer>
//! ```

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::tools::ToolName;

pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// Model output that does not follow the required format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Parsing LLM output produced both a final answer and a parse-able action")]
    ConflictingOutput,

    #[error("Invalid Format: Missing 'Action:' after 'Thought:'")]
    MissingAction,

    #[error("Invalid Format: Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,

    #[error("{0} is not a valid tool, try one of [Wikipedia, MathReasoning].")]
    UnknownTool(String),

    #[error("Could not parse LLM output")]
    Unparseable,
}

/// What the model decided to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    /// Call `tool` with `input`.
    Act {
        thought: String,
        tool: ToolName,
        input: String,
    },
    /// Stop with `answer`.
    Finish { thought: String, answer: String },
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("valid action regex")
    })
}

fn action_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Action\s*\d*\s*:").expect("valid action label regex"))
}

fn action_input_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("valid action input regex")
    })
}

/// Parse one model turn into a decision.
pub fn parse_agent_output(text: &str) -> Result<AgentDecision, ParseError> {
    let includes_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = action_regex().captures(text) {
        if includes_answer {
            return Err(ParseError::ConflictingOutput);
        }
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let input = caps
            .get(2)
            .map(|m| m.as_str().trim().trim_matches('"'))
            .unwrap_or_default();

        let tool = name
            .parse::<ToolName>()
            .map_err(|e| ParseError::UnknownTool(e.0))?;

        return Ok(AgentDecision::Act {
            thought: clean_thought(&text[..start]),
            tool,
            input: input.to_string(),
        });
    }

    if includes_answer {
        let (before, after) = text
            .rsplit_once(FINAL_ANSWER_MARKER)
            .unwrap_or(("", text));
        return Ok(AgentDecision::Finish {
            thought: clean_thought(before),
            answer: after.trim().to_string(),
        });
    }

    if !action_label_regex().is_match(text) {
        Err(ParseError::MissingAction)
    } else if !action_input_label_regex().is_match(text) {
        Err(ParseError::MissingActionInput)
    } else {
        Err(ParseError::Unparseable)
    }
}

fn clean_thought(s: &str) -> String {
    let s = s.trim();
    s.strip_prefix("Thought:").unwrap_or(s).trim().to_string()
}
