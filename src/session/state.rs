use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::annotate::Annotation;
use crate::auth::AuthorizationState;

/// Lifecycle state of a transcription session
///
/// Exactly one status is active at a time; every transition is made by the
/// session actor and published through its snapshot channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created; nothing requested yet
    Idle,
    /// Waiting on the permission provider
    Authorizing,
    /// Consent granted; ready to record
    Authorized,
    /// Consent refused
    Denied { reason: String },
    /// Capturing audio and streaming it to the recognizer
    Recording,
    /// No recording is running; carries why the last one ended (or why one
    /// never started)
    Stopped { reason: String },
}

impl SessionStatus {
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionStatus::Recording)
    }
}

/// Caller-observable session state
///
/// Published as a whole on every mutation; a snapshot is always internally
/// consistent because only the session actor writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub status: SessionStatus,
    pub authorization: AuthorizationState,
    /// Latest full transcript; replaced wholesale by recognizer updates,
    /// never appended to
    pub transcript: String,
    /// Result of the latest annotation pass; replaced wholesale every pass
    pub annotations: Vec<Annotation>,
    /// When the current (or most recent) recording started
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub(crate) fn new(session_id: String) -> Self {
        Self {
            session_id,
            status: SessionStatus::Idle,
            authorization: AuthorizationState::Undetermined,
            transcript: String::new(),
            annotations: Vec::new(),
            started_at: None,
        }
    }
}
