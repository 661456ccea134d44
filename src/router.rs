//! Question routing.
//!
//! Math-looking questions go straight to the reasoning prompt; everything else
//! is handed to the tool-using agent.

use serde::Serialize;

/// Substrings that mark a question as math. Matched case-insensitively.
pub const MATH_KEYWORDS: &[&str] = &[
    "age",
    "solve",
    "years",
    "equation",
    "times",
    "+",
    "-",
    "*",
    "/",
    "find",
    "add",
    "sum",
    "difference",
    "product",
    "number",
    "value",
    "math",
];

/// Path a question takes through the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Answer with a single math-reasoning completion
    DirectReasoning,
    /// Let the agent pick tools
    AgentDelegated,
}

/// Decide how to answer `question`.
pub fn route(question: &str) -> RoutingDecision {
    let lowered = question.to_lowercase();
    let decision = if MATH_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        RoutingDecision::DirectReasoning
    } else {
        RoutingDecision::AgentDelegated
    };
    tracing::debug!(?decision, question_len = question.len(), "Routed question");
    decision
}
