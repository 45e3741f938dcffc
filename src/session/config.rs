use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "session-2026-03-12-standup")
    pub session_id: String,

    /// Interval between annotation passes over the transcript
    /// Default: 1 second
    pub annotation_period: Duration,

    /// Upper bound on waiting for an authorization decision.
    /// `None` waits as long as the provider takes.
    pub authorization_timeout: Option<Duration>,

    /// Stop the session when the recognizer sends nothing for this long
    /// while recording. `None` disables the watchdog.
    pub backend_idle_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            annotation_period: Duration::from_secs(1),
            authorization_timeout: Some(Duration::from_secs(30)),
            backend_idle_timeout: None,
        }
    }
}
