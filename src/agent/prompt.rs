//! ReAct prompt template for the agent.

use crate::tools::ToolInfo;

use super::AgentStep;

/// Build the full agent prompt: tool list, format rules, question, and the
/// transcript of previous steps.
pub fn build_agent_prompt(question: &str, tools: &[ToolInfo], steps: &[AgentStep]) -> String {
    let tool_descriptions = tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let tool_names = tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Answer the following questions as best you can. You have access to the following tools:

{tool_descriptions}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {question}
Thought:{scratchpad}"#,
        tool_descriptions = tool_descriptions,
        tool_names = tool_names,
        question = question,
        scratchpad = build_scratchpad(steps),
    )
}

/// Render previous steps as the model will continue them.
pub fn build_scratchpad(steps: &[AgentStep]) -> String {
    steps
        .iter()
        .map(|step| {
            format!(
                "{}\nObservation: {}\nThought: ",
                step.log,
                step.observation.as_deref().unwrap_or_default()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolName;

    fn tools() -> Vec<ToolInfo> {
        vec![
            ToolInfo {
                name: ToolName::Wikipedia,
                description: "Use this for general knowledge or current events.".to_string(),
            },
            ToolInfo {
                name: ToolName::MathReasoning,
                description: "Useful for solving math problems.".to_string(),
            },
        ]
    }

    #[test]
    fn prompt_lists_tools_and_question() {
        let prompt = build_agent_prompt("Who wrote Hamlet?", &tools(), &[]);
        assert!(prompt.contains("Wikipedia: Use this for general knowledge or current events."));
        assert!(prompt.contains("should be one of [Wikipedia, MathReasoning]"));
        assert!(prompt.contains("Question: Who wrote Hamlet?"));
        assert!(prompt.ends_with("Thought:"));
    }

    #[test]
    fn scratchpad_replays_steps_in_order() {
        let steps = vec![
            AgentStep {
                log: " search\nAction: Wikipedia\nAction Input: Hamlet".to_string(),
                thought: "search".to_string(),
                action: Some(ToolName::Wikipedia),
                action_input: Some("Hamlet".to_string()),
                observation: Some("Page: Hamlet".to_string()),
            },
            AgentStep {
                log: "garbage".to_string(),
                thought: "garbage".to_string(),
                action: None,
                action_input: None,
                observation: Some("Invalid or incomplete response".to_string()),
            },
        ];

        let prompt = build_agent_prompt("Who wrote Hamlet?", &tools(), &steps);
        assert!(prompt.ends_with(
            "Thought: search\nAction: Wikipedia\nAction Input: Hamlet\nObservation: Page: Hamlet\nThought: garbage\nObservation: Invalid or incomplete response\nThought: "
        ));
    }
}
