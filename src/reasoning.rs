//! Direct math reasoning: one prompt, one completion.

use std::sync::Arc;

use crate::llm::{CompletionError, LlmClient};

const MATH_PROMPT: &str = r#"You are a brilliant math teacher. Solve the math problem step by step using logical reasoning.

Always:
1. Identify like terms and group them.
2. Move terms to one side to isolate variables.
3. Simplify each step with clear, simple explanation.
4. Provide the final boxed answer at the end.

Problem:
{question}

Detailed Solution:
"#;

/// Markers after which a completion carries provider metadata instead of answer text.
const METADATA_MARKERS: &[&str] = &[
    "additional_kwargs=",
    "response_metadata=",
    "usage_metadata=",
    "<|eot_id|>",
    "<|end_of_text|>",
    "<|im_end|>",
];

/// Fill the math template with `question`.
pub fn build_math_prompt(question: &str) -> String {
    MATH_PROMPT.replace("{question}", question)
}

/// Keep only the human-readable part of a completion.
pub fn extract_answer(raw: &str) -> String {
    let cut = METADATA_MARKERS
        .iter()
        .filter_map(|m| raw.find(m))
        .min()
        .unwrap_or(raw.len());
    raw[..cut].trim().to_string()
}

/// Answers questions with the math-teacher prompt.
#[derive(Clone)]
pub struct MathReasoner {
    llm: Arc<dyn LlmClient>,
}

impl MathReasoner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Solve `question` step by step. Not retried on failure.
    pub async fn reason(&self, question: &str) -> Result<String, CompletionError> {
        let prompt = build_math_prompt(question);
        let raw = self.llm.complete(&prompt, &[]).await?;
        Ok(extract_answer(&raw))
    }
}
