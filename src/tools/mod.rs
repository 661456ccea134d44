//! Tools the agent can call.
//!
//! The set is closed: [`ToolName`] names every tool, and [`ToolRegistry`]
//! maps each variant to its handler.

mod math;
mod wikipedia;

pub use math::MathReasoningTool;
pub use wikipedia::{
    format_summaries, KnowledgeLookup, LookupError, WikipediaClient, WikipediaTool, NO_RESULT,
};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::reasoning::MathReasoner;

/// Every tool the agent may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Wikipedia,
    MathReasoning,
}

impl ToolName {
    pub const ALL: [ToolName; 2] = [ToolName::Wikipedia, ToolName::MathReasoning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wikipedia => "Wikipedia",
            Self::MathReasoning => "MathReasoning",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name that matches no tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl FromStr for ToolName {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| UnknownTool(name.to_string()))
    }
}

/// A tool the agent can invoke with free-text input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which tool this is.
    fn name(&self) -> ToolName;

    /// Description shown to the model when it chooses an action.
    fn description(&self) -> &str;

    /// Run the tool once.
    async fn execute(&self, input: &str) -> anyhow::Result<String>;
}

/// Tool information for prompt building.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: ToolName,
    pub description: String,
}

/// Registry of the agent's tools.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Wire every [`ToolName`] to its collaborator.
    pub fn new(lookup: Arc<dyn KnowledgeLookup>, reasoner: MathReasoner) -> Self {
        Self {
            tools: vec![
                Arc::new(WikipediaTool::new(lookup)),
                Arc::new(MathReasoningTool::new(reasoner)),
            ],
        }
    }

    /// List all tools in prompt order.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Execute `tool` with `input`.
    pub async fn execute(&self, tool: ToolName, input: &str) -> anyhow::Result<String> {
        let handler = self
            .tools
            .iter()
            .find(|t| t.name() == tool)
            .ok_or_else(|| anyhow::anyhow!("Tool not registered: {}", tool))?;

        tracing::debug!(tool = %tool, input_len = input.len(), "Executing tool");
        handler.execute(input).await
    }
}
