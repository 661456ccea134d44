//! Chat session endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::routes::AppState;
use super::types::{
    ConversationResponse, CreateSessionRequest, CreateSessionResponse, ErrorBody,
    PostMessageRequest, PostMessageResponse,
};
use crate::config::ConfigError;

type ApiError = (StatusCode, Json<ErrorBody>);

fn error(status: StatusCode, kind: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: kind.to_string(),
            message: message.into(),
        }),
    )
}

fn not_found(id: Uuid) -> ApiError {
    error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("Session {} not found", id),
    )
}

/// Open a session. Refuses to start without a credential.
///
/// The body is optional, but a body that is sent must be a valid
/// `CreateSessionRequest`.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateSessionRequest::default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected session request body");
            return Err(error(
                StatusCode::BAD_REQUEST,
                "bad_request",
                rejection.body_text(),
            ));
        }
    };

    let api_key = state
        .config
        .resolve_api_key(req.api_key.as_deref())
        .map_err(|e| match e {
            ConfigError::MissingCredential => {
                error(StatusCode::UNAUTHORIZED, "configuration_error", e.to_string())
            }
            other => error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                other.to_string(),
            ),
        })?;

    let session = state
        .factory
        .create(api_key, req.model.as_deref())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build session");
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Could not start a chat session.",
            )
        })?;

    let model = session.model().to_string();
    let messages = session.conversation().all().to_vec();
    let (id, _) = state.sessions.create(session).await;
    tracing::info!(session_id = %id, model = %model, "Created chat session");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            id,
            model,
            messages,
        }),
    ))
}

/// Return the whole conversation in order.
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let handle = state.sessions.get(id).await.ok_or_else(|| not_found(id))?;
    let session = handle.lock().await;
    Ok(Json(ConversationResponse {
        id,
        messages: session.conversation().all().to_vec(),
    }))
}

/// Ask a question and wait for the assistant's reply.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<PostMessageResponse>, ApiError> {
    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "content is required",
        ));
    }

    let handle = state.sessions.get(id).await.ok_or_else(|| not_found(id))?;
    tracing::info!(session_id = %id, content_len = content.len(), "Received question");

    let answer = handle.lock().await.ask(&content).await;
    Ok(Json(PostMessageResponse {
        route: answer.route,
        message: answer.turn,
    }))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        tracing::info!(session_id = %id, "Deleted chat session");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
