use anyhow::{bail, Context, Result};
use async_nats::Client;
use async_trait::async_trait;
use base64::Engine;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::{BackendStream, TranscriptionBackend, TranscriptUpdate};
use super::messages::{AudioFrameMessage, TranscriptMessage};
use crate::audio::AudioFrame;

/// Connection settings for the NATS-backed recognizer
#[derive(Debug, Clone)]
pub struct NatsBackendConfig {
    /// NATS server URL
    pub url: String,
    /// Subject prefix for published audio; the session id is appended
    pub audio_subject_prefix: String,
    /// Wildcard subject carrying transcript results
    pub transcript_subject: String,
}

impl Default for NatsBackendConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            audio_subject_prefix: "audio.frame".to_string(),
            transcript_subject: "stt.text.>".to_string(),
        }
    }
}

/// Recognition backend over a NATS STT fabric
///
/// Audio frames go out as JSON on `<prefix>.<session_id>`; transcript results
/// come back on the transcript subject and are filtered by the session id in
/// the payload (the STT service publishes partial and final results on
/// separate subjects under the same wildcard). A zero-length frame with the
/// `final` flag marks end-of-audio for the recognizer.
pub struct NatsBackend {
    config: NatsBackendConfig,
    client: Client,
    publish_task: Option<JoinHandle<()>>,
    subscribe_task: Option<JoinHandle<()>>,
    running: bool,
}

impl NatsBackend {
    /// Connect to the NATS server
    pub async fn connect(config: NatsBackendConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", config.url);

        let client = async_nats::connect(config.url.as_str())
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            config,
            client,
            publish_task: None,
            subscribe_task: None,
            running: false,
        })
    }
}

#[async_trait]
impl TranscriptionBackend for NatsBackend {
    async fn start(&mut self, session_id: &str) -> Result<BackendStream> {
        if self.running {
            bail!("Recognition task is already running");
        }

        // Subscribe before pumping audio so no result is missed
        let mut subscriber = self
            .client
            .subscribe(self.config.transcript_subject.clone())
            .await
            .context("Failed to subscribe to transcripts")?;

        let (frame_tx, mut frame_rx) = mpsc::channel::<AudioFrame>(100);
        let (update_tx, update_rx) = mpsc::channel::<TranscriptUpdate>(100);

        let audio_subject = format!("{}.{}", self.config.audio_subject_prefix, session_id);
        let subject = audio_subject.clone();
        let client = self.client.clone();
        let id = session_id.to_string();

        self.publish_task = Some(tokio::spawn(async move {
            let mut sequence: u32 = 0;
            let mut last_format = (16000u32, 1u16);

            while let Some(frame) = frame_rx.recv().await {
                last_format = (frame.sample_rate, frame.channels);

                let pcm_bytes: Vec<u8> =
                    frame.samples.iter().flat_map(|&s| s.to_le_bytes()).collect();

                let message = AudioFrameMessage {
                    session_id: id.clone(),
                    sequence,
                    pcm: base64::engine::general_purpose::STANDARD.encode(&pcm_bytes),
                    sample_rate: frame.sample_rate,
                    channels: frame.channels,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    final_frame: false,
                };

                let payload = match serde_json::to_vec(&message) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Failed to encode audio frame: {}", e);
                        continue;
                    }
                };

                if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                    warn!("Failed to publish audio frame: {}", e);
                    return;
                }

                if sequence % 50 == 0 {
                    debug!("Published audio frame {} to {}", sequence, subject);
                }

                sequence += 1;
            }

            // Sink dropped: tell the recognizer the audio is complete
            let marker = AudioFrameMessage {
                session_id: id,
                sequence,
                pcm: String::new(),
                sample_rate: last_format.0,
                channels: last_format.1,
                timestamp: chrono::Utc::now().to_rfc3339(),
                final_frame: true,
            };

            match serde_json::to_vec(&marker) {
                Ok(payload) => {
                    if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                        warn!("Failed to publish final frame marker: {}", e);
                    } else {
                        info!(
                            "Published final frame marker to {} ({} frames)",
                            subject, sequence
                        );
                    }
                }
                Err(e) => warn!("Failed to encode final frame marker: {}", e),
            }
        }));

        let id = session_id.to_string();

        self.subscribe_task = Some(tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let transcript = match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                    Ok(transcript) => transcript,
                    Err(e) => {
                        debug!("Ignoring unparseable transcript message: {}", e);
                        continue;
                    }
                };

                if transcript.session_id != id {
                    continue;
                }

                let is_final = !transcript.partial || transcript.error.is_some();
                let text = if transcript.error.is_none() && !transcript.text.is_empty() {
                    Some(transcript.text)
                } else {
                    None
                };

                let update = TranscriptUpdate {
                    text,
                    is_final,
                    confidence: transcript.confidence,
                    error: transcript.error,
                };

                if update_tx.send(update).await.is_err() {
                    // Session side is gone
                    break;
                }

                if is_final {
                    info!("Final transcript received for session {}", id);
                    break;
                }
            }
        }));

        self.running = true;
        info!(
            "NATS recognition started for session {} (audio -> {})",
            session_id, audio_subject
        );

        Ok(BackendStream {
            frames: frame_tx,
            updates: update_rx,
        })
    }

    async fn cancel(&mut self) -> Result<()> {
        if let Some(task) = self.publish_task.take() {
            task.abort();
        }
        if let Some(task) = self.subscribe_task.take() {
            task.abort();
        }

        if self.running {
            info!("NATS recognition cancelled");
        }
        self.running = false;

        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn name(&self) -> &str {
        "nats"
    }
}
