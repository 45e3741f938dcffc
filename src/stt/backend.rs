use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::audio::AudioFrame;

/// A transcript candidate produced by a recognition backend
///
/// Every update that carries text is a full replacement for the transcript
/// so far, not an increment.
#[derive(Debug, Clone)]
pub struct TranscriptUpdate {
    /// Replacement transcript text, when the update carries any
    pub text: Option<String>,
    /// Recognition is finished; no further updates follow
    pub is_final: bool,
    /// Recognizer confidence for this candidate, when reported
    pub confidence: Option<f32>,
    /// Failure description; the recognition task is over
    pub error: Option<String>,
}

impl TranscriptUpdate {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            is_final: false,
            confidence: None,
            error: None,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            is_final: true,
            confidence: None,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            text: None,
            is_final: true,
            confidence: None,
            error: Some(message.into()),
        }
    }
}

/// Live recognition hookup for one recording
pub struct BackendStream {
    /// Sink for captured frames; dropping it signals end-of-audio
    pub frames: mpsc::Sender<AudioFrame>,
    /// Transcript updates, oldest first. The channel closing without a final
    /// update means the backend became unavailable.
    pub updates: mpsc::Receiver<TranscriptUpdate>,
}

/// Speech recognition engine
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Begin a recognition task for one recording
    async fn start(&mut self, session_id: &str) -> Result<BackendStream>;

    /// Tear down the in-flight recognition task, discarding pending results
    ///
    /// Safe to call when nothing is running.
    async fn cancel(&mut self) -> Result<()>;

    /// Whether a recognition task is in flight
    fn is_running(&self) -> bool;

    /// Backend name for logging
    fn name(&self) -> &str;
}
