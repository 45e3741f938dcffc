use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::state::AppState;
use crate::annotate::{Annotation, LexiconAnnotator};
use crate::audio::{SourceConfig, WavSource};
use crate::auth::{AuthorizationState, StaticPermissions};
use crate::session::{SessionConfig, SessionSnapshot, StartError, TranscriptionSession};
use crate::stt::{NatsBackend, NatsBackendConfig};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// WAV file streamed as the session's audio source
    pub audio_path: String,

    /// Annotation interval in milliseconds (default from config)
    pub annotation_period_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StopSessionRequest {
    /// Reason recorded in the final status
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: String,
    pub message: String,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions/start
/// Create, authorize, and start a transcription session
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()));

    info!("Starting transcription session: {}", session_id);

    // Check for an existing session under this id
    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&session_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Session {} already exists", session_id),
                }),
            )
                .into_response();
        }
    }

    let defaults = &state.config.session;
    let config = SessionConfig {
        session_id: session_id.clone(),
        annotation_period: Duration::from_millis(
            req.annotation_period_ms
                .unwrap_or(defaults.annotation_period_ms),
        ),
        authorization_timeout: defaults.authorization_timeout_secs.map(Duration::from_secs),
        backend_idle_timeout: defaults.backend_idle_timeout_secs.map(Duration::from_secs),
    };

    let source_config = SourceConfig {
        sample_rate: state.config.audio.sample_rate,
        channels: state.config.audio.channels,
        buffer_duration_ms: state.config.audio.frame_ms,
    };
    let source = WavSource::new(&req.audio_path, source_config);

    let backend_config = NatsBackendConfig {
        url: state.config.nats.url.clone(),
        audio_subject_prefix: state.config.nats.audio_subject_prefix.clone(),
        transcript_subject: state.config.nats.transcript_subject.clone(),
    };
    let backend = match NatsBackend::connect(backend_config).await {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to connect session backend: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to connect to NATS: {}", e),
                }),
            )
                .into_response();
        }
    };

    // A headless service has no one to prompt; consent is granted by
    // deployment
    let session = Arc::new(TranscriptionSession::new(
        config,
        Box::new(source),
        Box::new(backend),
        Box::new(LexiconAnnotator::new()),
        Arc::new(StaticPermissions::granted()),
    ));

    let mut updates = session.subscribe();
    session.request_authorization().await;

    // Reduce to a bool in one statement: the watch guard must not live
    // across the next await, or the handler future stops being Send
    let decided = updates
        .wait_for(|snapshot| snapshot.authorization != AuthorizationState::Undetermined)
        .await
        .is_ok();
    if !decided {
        error!("Session {} closed before authorization resolved", session_id);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Session closed during authorization".to_string(),
            }),
        )
            .into_response();
    }

    if let Err(e) = session.start().await {
        error!("Failed to start session {}: {}", session_id, e);
        let status = match e {
            StartError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
            StartError::AlreadyRecording => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        return (
            status,
            Json(ErrorResponse {
                error: format!("Failed to start session: {}", e),
            }),
        )
            .into_response();
    }

    // Store session, re-checking the id under the write lock: a concurrent
    // start may have taken it since the early check
    let clash = {
        let mut sessions = state.sessions.write().await;
        match sessions.entry(session_id.clone()) {
            Entry::Occupied(_) => true,
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&session));
                false
            }
        }
    };

    if clash {
        session.stop("Superseded by a concurrent start.").await;
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Session {} already exists", session_id),
            }),
        )
            .into_response();
    }

    info!("Session started successfully: {}", session_id);

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            session_id: session_id.clone(),
            status: "recording".to_string(),
            message: format!("Transcription started for session {}", session_id),
        }),
    )
        .into_response()
}

/// POST /sessions/:session_id/stop
/// Stop a session and return its final snapshot
pub async fn stop_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Option<Json<StopSessionRequest>>,
) -> impl IntoResponse {
    info!("Stopping transcription session: {}", session_id);

    let reason = body
        .and_then(|Json(req)| req.reason)
        .unwrap_or_else(|| "Stopped by request.".to_string());

    // Find and remove session
    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match session {
        Some(session) => {
            session.stop(reason).await;
            let snapshot = session.snapshot();

            info!("Session stopped successfully: {}", session_id);

            (
                StatusCode::OK,
                Json(StopSessionResponse {
                    session_id,
                    message: "Session stopped".to_string(),
                    snapshot,
                }),
            )
                .into_response()
        }
        None => {
            error!("Session {} not found", session_id);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Session {} not found", session_id),
                }),
            )
                .into_response()
        }
    }
}

/// GET /sessions/:session_id/status
/// Full observable state of a session
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => (StatusCode::OK, Json(session.snapshot())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /sessions/:session_id/transcript
/// Latest transcript text
pub async fn get_session_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => (
            StatusCode::OK,
            Json(TranscriptResponse {
                session_id,
                transcript: session.transcript(),
            }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /sessions/:session_id/annotations
/// Result of the latest annotation pass
pub async fn get_session_annotations(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            let annotations: Vec<Annotation> = session.annotations();
            (StatusCode::OK, Json(annotations)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
