use serde::{Deserialize, Serialize};

/// Audio frame message published to the STT service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFrameMessage {
    pub session_id: String,
    pub sequence: u32,
    /// Base64-encoded PCM bytes (i16 little-endian, interleaved)
    pub pcm: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// RFC3339 timestamp
    pub timestamp: String,
    #[serde(rename = "final")]
    pub final_frame: bool,
}

/// Transcript message received from the STT service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    /// RFC3339 timestamp
    pub timestamp: String,
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Recognizer-side failure; text is not usable when set
    #[serde(default)]
    pub error: Option<String>,
}
