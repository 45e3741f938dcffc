// Example: Scripted transcription session, fully offline
//
// This example walks through the complete session lifecycle without any
// external services:
// 1. Build a session from a push-fed audio source and a scripted backend
// 2. Request authorization and wait for the decision
// 3. Start recording and feed audio frames
// 4. Watch transcript and annotation snapshots as they evolve
// 5. Observe the final update land the session in Stopped
//
// Usage: cargo run --example live_session

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, Level};
use voxtag::{
    AudioFrame, AuthorizationState, BackendStream, LexiconAnnotator, PushSource, SessionConfig,
    SessionStatus, StaticPermissions, TranscriptUpdate, TranscriptionBackend, TranscriptionSession,
};

/// Backend that replays a canned recognition script with realistic pacing
struct ScriptedBackend {
    script: Vec<TranscriptUpdate>,
    running: bool,
}

impl ScriptedBackend {
    fn new(script: Vec<TranscriptUpdate>) -> Self {
        Self {
            script,
            running: false,
        }
    }
}

#[async_trait]
impl TranscriptionBackend for ScriptedBackend {
    async fn start(&mut self, session_id: &str) -> Result<BackendStream> {
        info!("Scripted backend started for session: {}", session_id);

        let (frame_tx, mut frame_rx) = mpsc::channel::<AudioFrame>(100);
        let (update_tx, update_rx) = mpsc::channel(100);

        // Count the frames we are handed, like a real recognizer would consume
        tokio::spawn(async move {
            let mut frames = 0u32;
            while frame_rx.recv().await.is_some() {
                frames += 1;
            }
            info!("Scripted backend consumed {} audio frames", frames);
        });

        let script = self.script.clone();
        tokio::spawn(async move {
            for update in script {
                sleep(Duration::from_millis(400)).await;
                if update_tx.send(update).await.is_err() {
                    break;
                }
            }
        });

        self.running = true;

        Ok(BackendStream {
            frames: frame_tx,
            updates: update_rx,
        })
    }

    async fn cancel(&mut self) -> Result<()> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Voxtag - Scripted Session Example");

    // Recognition script: partial hypotheses refine each other, then a final
    // candidate ends the session
    let script = vec![
        TranscriptUpdate::partial("Paris"),
        TranscriptUpdate::partial("Paris is"),
        TranscriptUpdate::partial("Paris is nice"),
        TranscriptUpdate::final_text("Paris is nice and Sarah quickly agreed"),
    ];

    let (source, feed) = PushSource::new();

    let config = SessionConfig {
        annotation_period: Duration::from_millis(250),
        ..SessionConfig::default()
    };

    let session = TranscriptionSession::new(
        config,
        Box::new(source),
        Box::new(ScriptedBackend::new(script)),
        Box::new(LexiconAnnotator::new()),
        Arc::new(StaticPermissions::granted()),
    );

    let mut updates = session.subscribe();

    // Ask for consent and wait for the decision to land
    info!("Requesting authorization...");
    session.request_authorization().await;
    updates
        .wait_for(|s| s.authorization != AuthorizationState::Undetermined)
        .await?;
    info!("Authorization: {:?}", session.snapshot().authorization);

    // Start recording
    session.start().await?;
    info!("Recording started");

    // Feed 100ms frames of silence while the script plays out
    let producer = tokio::spawn(async move {
        for i in 0..20u64 {
            let frame = AudioFrame {
                samples: vec![0i16; 1600],
                sample_rate: 16000,
                channels: 1,
                timestamp_ms: i * 100,
            };
            if feed.push(frame).await.is_err() {
                break;
            }
            sleep(Duration::from_millis(100)).await;
        }
    });

    // Watch observable state until the final update stops the session
    loop {
        updates.changed().await?;
        let snapshot = updates.borrow_and_update().clone();

        info!("Transcript: {:?}", snapshot.transcript);
        for annotation in &snapshot.annotations {
            info!("  [{:?}] {}", annotation.kind, annotation.text);
        }

        if let SessionStatus::Stopped { reason } = &snapshot.status {
            info!("Session stopped: {}", reason);
            break;
        }
    }

    producer.abort();

    // Print summary
    let snapshot = session.snapshot();
    info!("Final transcript: {}", snapshot.transcript);
    info!("Final annotations:");
    for annotation in &snapshot.annotations {
        info!("  [{:?}] {}", annotation.kind, annotation.text);
    }

    Ok(())
}
