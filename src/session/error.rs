use thiserror::Error;

/// Why `start()` refused or failed to begin a recording
#[derive(Debug, Error)]
pub enum StartError {
    /// Capture consent is missing or was refused; no resource was touched
    #[error("not authorized to record: {reason}")]
    NotAuthorized { reason: String },

    /// A recording is already active for this session
    #[error("a recording is already active")]
    AlreadyRecording,

    /// The audio source could not be opened
    #[error("audio source unavailable: {0}")]
    AudioUnavailable(String),

    /// The transcription backend could not be started
    #[error("transcription backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The session actor is no longer running
    #[error("session is closed")]
    SessionClosed,
}
