//! Chat sessions: one conversation plus the collaborators bound to its credential.

use std::sync::Arc;

use crate::agent::Agent;
use crate::config::{AgentLimits, Config};
use crate::conversation::{Conversation, Turn};
use crate::llm::{CompletionError, GroqClient, LlmClient};
use crate::reasoning::MathReasoner;
use crate::router::{route, RoutingDecision};
use crate::tools::{KnowledgeLookup, WikipediaClient};

/// Assistant reply when answering fails. Details go to the log, not the user.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, an error occurred while answering your question. Please try again.";

/// Reply to one question.
#[derive(Debug, Clone)]
pub struct Answer {
    pub route: RoutingDecision,
    pub turn: Turn,
}

/// A single user's chat.
pub struct ChatSession {
    model: String,
    reasoner: MathReasoner,
    agent: Agent,
    conversation: Conversation,
}

impl ChatSession {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        lookup: Arc<dyn KnowledgeLookup>,
        limits: AgentLimits,
    ) -> Self {
        Self {
            model: llm.model().to_string(),
            reasoner: MathReasoner::new(llm.clone()),
            agent: Agent::new(llm, lookup, limits),
            conversation: Conversation::seeded(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Record `question`, answer it, and record the answer.
    ///
    /// Never fails: a collaborator error is logged and answered with
    /// [`GENERIC_ERROR_MESSAGE`] so the session stays usable.
    pub async fn ask(&mut self, question: &str) -> Answer {
        self.conversation.append(Turn::user(question));

        let decision = route(question);
        let reply = match self.answer(decision, question).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, route = ?decision, "Failed to answer question");
                GENERIC_ERROR_MESSAGE.to_string()
            }
        };

        let turn = Turn::assistant(reply);
        self.conversation.append(turn.clone());
        Answer {
            route: decision,
            turn,
        }
    }

    async fn answer(
        &self,
        decision: RoutingDecision,
        question: &str,
    ) -> Result<String, CompletionError> {
        match decision {
            RoutingDecision::DirectReasoning => self.reasoner.reason(question).await,
            RoutingDecision::AgentDelegated => {
                let outcome = self.agent.run(question).await?;
                tracing::info!(
                    steps = outcome.steps.len(),
                    stop = ?outcome.stop,
                    "Agent finished"
                );
                Ok(outcome.answer)
            }
        }
    }
}

/// Builds sessions for a resolved credential.
pub trait SessionFactory: Send + Sync {
    fn create(&self, api_key: String, model: Option<&str>) -> anyhow::Result<ChatSession>;
}

/// Production factory: Groq for reasoning, Wikipedia for lookups.
pub struct GroqSessionFactory {
    config: Config,
}

impl GroqSessionFactory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl SessionFactory for GroqSessionFactory {
    fn create(&self, api_key: String, model: Option<&str>) -> anyhow::Result<ChatSession> {
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.config.default_model.as_str());

        let llm = GroqClient::new(
            api_key,
            self.config.base_url.clone(),
            model,
            self.config.request_timeout,
        )?;
        let lookup =
            WikipediaClient::new(self.config.wikipedia.clone(), self.config.request_timeout)?;

        Ok(ChatSession::new(
            Arc::new(llm),
            Arc::new(lookup),
            self.config.agent,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::TurnRole;
    use crate::testing::{FakeLookup, ScriptedLlm};

    #[tokio::test]
    async fn math_question_uses_direct_reasoning() {
        let llm = Arc::new(ScriptedLlm::new(["  2x = 4, so x = 2  "]));
        let lookup = Arc::new(FakeLookup::answering("unused"));
        let mut session = ChatSession::new(llm.clone(), lookup.clone(), AgentLimits::default());

        let answer = session.ask("Solve 2x + 3 = 7 for x").await;

        assert_eq!(answer.route, RoutingDecision::DirectReasoning);
        assert_eq!(answer.turn.content(), "2x = 4, so x = 2");
        assert_eq!(llm.prompts().len(), 1);
        assert!(lookup.queries().is_empty());

        let turns = session.conversation().all();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role(), TurnRole::User);
        assert_eq!(turns[1].content(), "Solve 2x + 3 = 7 for x");
        assert_eq!(turns[2].role(), TurnRole::Assistant);
    }

    #[tokio::test]
    async fn general_question_uses_agent() {
        let llm = Arc::new(ScriptedLlm::new([
            "Action: Wikipedia\nAction Input: first president of the United States",
            "Thought: I now know the final answer\nFinal Answer: George Washington",
        ]));
        let lookup = Arc::new(FakeLookup::answering("Page: George Washington"));
        let mut session = ChatSession::new(llm, lookup.clone(), AgentLimits::default());

        let answer = session
            .ask("Who was the first president of the United States?")
            .await;

        assert_eq!(answer.route, RoutingDecision::AgentDelegated);
        assert_eq!(answer.turn.content(), "George Washington");
        assert_eq!(lookup.queries().len(), 1);
    }

    #[tokio::test]
    async fn failing_llm_yields_generic_turn_and_session_survives() {
        let llm = Arc::new(ScriptedLlm::failing());
        let lookup = Arc::new(FakeLookup::answering("unused"));
        let mut session = ChatSession::new(llm, lookup, AgentLimits::default());

        let first = session.ask("What is 2 + 2?").await;
        assert_eq!(first.turn.content(), GENERIC_ERROR_MESSAGE);
        assert_eq!(first.turn.role(), TurnRole::Assistant);

        let second = session.ask("Who wrote Hamlet?").await;
        assert_eq!(second.turn.content(), GENERIC_ERROR_MESSAGE);
        assert_eq!(session.conversation().len(), 5);
    }

    #[test]
    fn factory_uses_default_model_when_none_given() {
        let config = Config::new(None, "llama-3.1-8b-instant".to_string());
        let factory = GroqSessionFactory::new(config);
        let session = factory.create("key".to_string(), Some("  ")).unwrap();
        assert_eq!(session.model(), "llama-3.1-8b-instant");

        let session = factory
            .create("key".to_string(), Some("llama-3.3-70b-versatile"))
            .unwrap();
        assert_eq!(session.model(), "llama-3.3-70b-versatile");
        assert_eq!(session.conversation().len(), 1);
    }
}
