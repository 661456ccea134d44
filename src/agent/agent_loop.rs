//! Core agent loop implementation.

use std::sync::Arc;

use crate::config::AgentLimits;
use crate::llm::{CompletionError, LlmClient};
use crate::reasoning::{extract_answer, MathReasoner};
use crate::tools::{KnowledgeLookup, ToolInfo, ToolRegistry};

use super::parser::{parse_agent_output, AgentDecision, ParseError};
use super::prompt::build_agent_prompt;
use super::AgentStep;

/// Models tend to invent their own observations; generation stops here.
const OBSERVATION_STOP: &str = "\nObservation:";

pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit.";

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FinalAnswer,
    ParseRetriesExhausted,
    IterationLimit,
}

/// Result of one agent run.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub answer: String,
    pub steps: Vec<AgentStep>,
    pub stop: StopReason,
}

/// The tool-using agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    limits: AgentLimits,
}

impl Agent {
    /// Create an agent whose `MathReasoning` tool shares `llm`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        lookup: Arc<dyn KnowledgeLookup>,
        limits: AgentLimits,
    ) -> Self {
        let tools = ToolRegistry::new(lookup, MathReasoner::new(llm.clone()));
        Self { llm, tools, limits }
    }

    /// Answer `question`, calling tools as the model asks.
    ///
    /// Tool failures become observations. Only a failed model call ends the
    /// run with an error.
    pub async fn run(&self, question: &str) -> Result<AgentOutcome, CompletionError> {
        let tool_info: Vec<ToolInfo> = self.tools.list_tools();
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut parse_errors = 0usize;

        for iteration in 0..self.limits.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let prompt = build_agent_prompt(question, &tool_info, &steps);
            let raw = self.llm.complete(&prompt, &[OBSERVATION_STOP]).await?;
            let output = cut_at_observation(&raw);

            match parse_agent_output(output) {
                Ok(AgentDecision::Finish { answer, .. }) => {
                    return Ok(AgentOutcome {
                        answer: extract_answer(&answer),
                        steps,
                        stop: StopReason::FinalAnswer,
                    });
                }
                Ok(AgentDecision::Act {
                    thought,
                    tool,
                    input,
                }) => {
                    let observation = match self.tools.execute(tool, &input).await {
                        Ok(result) => result,
                        Err(e) => {
                            tracing::warn!(tool = %tool, error = %e, "Tool call failed");
                            format!("Error: {}", e)
                        }
                    };

                    steps.push(AgentStep {
                        log: output.to_string(),
                        thought,
                        action: Some(tool),
                        action_input: Some(input),
                        observation: Some(observation),
                    });
                }
                Err(e) => {
                    parse_errors += 1;
                    tracing::warn!(
                        error = %e,
                        attempt = parse_errors,
                        "Malformed agent output"
                    );

                    if parse_errors > self.limits.max_parse_retries {
                        return Ok(AgentOutcome {
                            answer: degraded_answer(output),
                            steps,
                            stop: StopReason::ParseRetriesExhausted,
                        });
                    }

                    steps.push(AgentStep {
                        log: output.to_string(),
                        thought: output.trim().to_string(),
                        action: None,
                        action_input: None,
                        observation: Some(parse_error_observation(&e)),
                    });
                }
            }
        }

        tracing::warn!(
            max_iterations = self.limits.max_iterations,
            "Agent hit iteration limit"
        );
        Ok(AgentOutcome {
            answer: partial_answer(&steps),
            steps,
            stop: StopReason::IterationLimit,
        })
    }
}

fn cut_at_observation(raw: &str) -> &str {
    match raw.find(OBSERVATION_STOP) {
        Some(idx) => &raw[..idx],
        None => raw,
    }
}

fn parse_error_observation(err: &ParseError) -> String {
    format!(
        "Invalid or incomplete response: {}. The previous output was malformed, try again using the required format.",
        err
    )
}

fn degraded_answer(last_output: &str) -> String {
    format!(
        "I could not produce a well-formed answer. Last model output:\n{}",
        last_output.trim()
    )
}

/// Best answer available when the loop runs out of iterations: the latest
/// tool observation, if any.
fn partial_answer(steps: &[AgentStep]) -> String {
    steps
        .iter()
        .rev()
        .filter(|s| s.action.is_some())
        .find_map(|s| s.observation.as_deref())
        .map(|obs| format!("{}\n\n{}", ITERATION_LIMIT_MESSAGE, obs))
        .unwrap_or_else(|| ITERATION_LIMIT_MESSAGE.to_string())
}
