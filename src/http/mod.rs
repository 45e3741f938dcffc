//! HTTP API for external session control
//!
//! This module provides a REST API for driving transcription sessions:
//! - POST /sessions/start - Create, authorize, and start a session
//! - POST /sessions/:id/stop - Stop a session, returning its final snapshot
//! - GET /sessions/:id/status - Full observable session state
//! - GET /sessions/:id/transcript - Latest transcript text
//! - GET /sessions/:id/annotations - Latest annotation pass
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
