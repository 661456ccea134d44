//! Router construction and server startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::session_store::SessionStore;
use super::sessions;
use super::types::HealthResponse;
use crate::config::Config;
use crate::session::{GroqSessionFactory, SessionFactory};

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across handlers.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub factory: Arc<dyn SessionFactory>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let factory = Arc::new(GroqSessionFactory::new(config.clone()));
        Self::with_factory(config, factory)
    }

    /// Build state around a custom session factory.
    pub fn with_factory(config: Config, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            config,
            sessions: SessionStore::new(),
            factory,
        }
    }
}

/// All API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/sessions", post(sessions::create_session))
        .route(
            "/api/sessions/:id",
            axum::routing::delete(sessions::delete_session),
        )
        .route(
            "/api/sessions/:id/messages",
            get(sessions::get_messages).post(sessions::post_message),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until the process is stopped.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    if config.api_key.is_none() {
        tracing::info!("GROQ_API_KEY not set; sessions must supply their own key");
    }

    let idle_timeout = config.session_idle_timeout;
    let state = Arc::new(AppState::new(config));
    spawn_idle_sweeper(state.sessions.clone(), idle_timeout);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically drop sessions idle for longer than `idle_timeout`.
fn spawn_idle_sweeper(sessions: SessionStore, idle_timeout: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let evicted = sessions.evict_idle(idle_timeout).await;
            if evicted > 0 {
                let remaining = sessions.len().await;
                tracing::info!(
                    evicted,
                    remaining,
                    "Evicted idle chat sessions"
                );
            }
        }
    });
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
