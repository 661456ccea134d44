//! HTTP API tests against scripted collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use mathsgpt::api::{router, AppState};
use mathsgpt::config::{AgentLimits, Config, MISSING_KEY_PROMPT};
use mathsgpt::llm::{CompletionError, LlmClient};
use mathsgpt::session::{ChatSession, SessionFactory, GENERIC_ERROR_MESSAGE};
use mathsgpt::tools::{KnowledgeLookup, LookupError};

struct QueueLlm {
    replies: Mutex<VecDeque<Result<String, ()>>>,
}

#[async_trait]
impl LlmClient for QueueLlm {
    async fn complete(&self, _prompt: &str, _stop: &[&str]) -> Result<String, CompletionError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(())) => Err(CompletionError::Timeout),
            None => Err(CompletionError::EmptyResponse),
        }
    }

    fn model(&self) -> &str {
        "test-model"
    }
}

struct StaticLookup;

#[async_trait]
impl KnowledgeLookup for StaticLookup {
    async fn lookup(&self, _query: &str) -> Result<String, LookupError> {
        Ok("Page: George Washington\nSummary: First president of the United States.".to_string())
    }
}

/// Hands every new session the same scripted replies.
struct ScriptedFactory {
    replies: Vec<Result<String, ()>>,
    created: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl ScriptedFactory {
    fn new(replies: Vec<Result<&str, ()>>) -> Arc<Self> {
        Arc::new(Self {
            replies: replies
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect(),
            created: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        })
    }
}

impl SessionFactory for ScriptedFactory {
    fn create(&self, api_key: String, _model: Option<&str>) -> anyhow::Result<ChatSession> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(api_key);
        let llm = QueueLlm {
            replies: Mutex::new(self.replies.iter().cloned().collect()),
        };
        Ok(ChatSession::new(
            Arc::new(llm),
            Arc::new(StaticLookup),
            AgentLimits::default(),
        ))
    }
}

fn app(server_key: Option<&str>, factory: Arc<ScriptedFactory>) -> Router {
    let config = Config::new(server_key.map(str::to_string), "test-model".to_string());
    router(Arc::new(AppState::with_factory(config, factory)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/sessions",
        Some(json!({"api_key": "gsk_test"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(None, ScriptedFactory::new(vec![]));
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_credential_blocks_session_creation() {
    let factory = ScriptedFactory::new(vec![Ok("unused")]);
    let app = app(None, factory.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({"api_key": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "configuration_error");
    assert_eq!(body["message"], MISSING_KEY_PROMPT);

    let (status, _) = send(&app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_key_is_used_when_request_has_none() {
    let factory = ScriptedFactory::new(vec![]);
    let app = app(Some("gsk_server"), factory.clone());

    let (status, body) = send(&app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["model"], "test-model");
    assert_eq!(*factory.keys.lock().unwrap(), vec!["gsk_server".to_string()]);
}

#[tokio::test]
async fn malformed_create_body_is_rejected() {
    let factory = ScriptedFactory::new(vec![]);
    let app = app(Some("gsk_server"), factory.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({"api_key": 123})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let request = Request::builder()
        .method("POST")
        .uri("/api/sessions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn new_session_starts_with_greeting() {
    let app = app(None, ScriptedFactory::new(vec![]));
    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({"api_key": "gsk_test"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "assistant");
    assert_eq!(messages[0]["content"], "Hi! Ask me any math or general question.");
}

#[tokio::test]
async fn math_question_is_answered_directly() {
    let app = app(None, ScriptedFactory::new(vec![Ok("  x = 2  ")]));
    let id = create_session(&app).await;

    let uri = format!("/api/sessions/{}/messages", id);
    let question = json!({"content": "Solve 2x + 3 = 7 for x"});
    let (status, body) = send(&app, "POST", &uri, Some(question)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "direct_reasoning");
    assert_eq!(body["message"]["role"], "assistant");
    assert_eq!(body["message"]["content"], "x = 2");

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(
        contents,
        vec![
            "Hi! Ask me any math or general question.",
            "Solve 2x + 3 = 7 for x",
            "x = 2"
        ]
    );
}

#[tokio::test]
async fn general_question_goes_through_agent() {
    let app = app(
        None,
        ScriptedFactory::new(vec![
            Ok("I should look this up.\nAction: Wikipedia\nAction Input: first president of the United States"),
            Ok("I now know the final answer\nFinal Answer: George Washington"),
        ]),
    );
    let id = create_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/messages", id),
        Some(json!({"content": "Who was the first president of the United States?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "agent_delegated");
    assert_eq!(body["message"]["content"], "George Washington");
}

#[tokio::test]
async fn llm_failure_returns_generic_turn_and_session_continues() {
    let app = app(None, ScriptedFactory::new(vec![Err(()), Ok("x = 3")]));
    let id = create_session(&app).await;
    let uri = format!("/api/sessions/{}/messages", id);

    let question = json!({"content": "What is 1 + 1?"});
    let (status, body) = send(&app, "POST", &uri, Some(question)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["content"], GENERIC_ERROR_MESSAGE);

    let question = json!({"content": "Solve x - 1 = 2"});
    let (status, body) = send(&app, "POST", &uri, Some(question)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["content"], "x = 3");

    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let app = app(None, ScriptedFactory::new(vec![]));
    let id = create_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/messages", id),
        Some(json!({"content": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = app(None, ScriptedFactory::new(vec![]));
    let uri = format!("/api/sessions/{}/messages", uuid::Uuid::new_v4());

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", &uri, Some(json!({"content": "hi"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let app = app(None, ScriptedFactory::new(vec![]));
    let id = create_session(&app).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{}/messages", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
