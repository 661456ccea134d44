//! The `MathReasoning` agent tool.

use async_trait::async_trait;

use super::{Tool, ToolName};
use crate::reasoning::MathReasoner;

/// Exposes [`MathReasoner`] to the agent.
pub struct MathReasoningTool {
    reasoner: MathReasoner,
}

impl MathReasoningTool {
    pub fn new(reasoner: MathReasoner) -> Self {
        Self { reasoner }
    }
}

#[async_trait]
impl Tool for MathReasoningTool {
    fn name(&self) -> ToolName {
        ToolName::MathReasoning
    }

    fn description(&self) -> &str {
        "Useful for solving math problems with step-by-step reasoning."
    }

    async fn execute(&self, input: &str) -> anyhow::Result<String> {
        Ok(self.reasoner.reason(input).await?)
    }
}
