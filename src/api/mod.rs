//! HTTP API consumed by the chat widget.
//!
//! - `GET    /api/health`
//! - `POST   /api/sessions`
//! - `DELETE /api/sessions/:id`
//! - `GET    /api/sessions/:id/messages`
//! - `POST   /api/sessions/:id/messages`
//!
//! A session answers one question at a time. While a question is running,
//! other requests for the same session, including `GET .../messages`, wait
//! for it to finish. Sessions idle longer than `SESSION_IDLE_SECS` are dropped
//! by a background sweep.

mod routes;
mod session_store;
mod sessions;
pub mod types;

pub use routes::{router, serve, AppState};
pub use session_store::{SessionHandle, SessionStore};
