// Example: Live transcription session over NATS
//
// This example runs the full pipeline against a real transcription service:
// 1. Stream a WAV file as paced audio frames
// 2. Publish frames to NATS and subscribe to transcript results
// 3. Annotate the live transcript once per second
// 4. Print transcript and annotations until the session stops
//
// Requirements: a NATS server and an STT service that consumes
// `audio.frame.<session_id>` and publishes to `stt.text.<session_id>`.
//
// Usage: cargo run --example nats_session -- --file recording.wav

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use voxtag::{
    AuthorizationState, LexiconAnnotator, NatsBackend, NatsBackendConfig, SessionConfig,
    SessionStatus, SourceConfig, StaticPermissions, TranscriptionSession, WavSource,
};

#[derive(Parser)]
#[command(name = "nats_session")]
#[command(about = "Transcribe a WAV file through a NATS-connected STT service")]
struct Args {
    /// Path to the WAV file to stream
    #[arg(short, long)]
    file: String,

    /// NATS server URL
    #[arg(short, long, default_value = "nats://localhost:4222")]
    nats_url: String,

    /// Session ID (random when omitted)
    #[arg(short, long)]
    session_id: Option<String>,

    /// Annotation period in milliseconds
    #[arg(short, long, default_value = "1000")]
    annotation_period: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let args = Args::parse();

    info!("Voxtag - NATS Session Example");
    info!("WAV file: {}", args.file);
    info!("NATS server: {}", args.nats_url);

    // Stream the file at its real-time pace, as if it were a microphone
    let source = WavSource::new(&args.file, SourceConfig::default());

    let backend = NatsBackend::connect(NatsBackendConfig {
        url: args.nats_url,
        ..NatsBackendConfig::default()
    })
    .await?;

    let mut config = SessionConfig {
        annotation_period: Duration::from_millis(args.annotation_period),
        ..SessionConfig::default()
    };
    if let Some(session_id) = args.session_id {
        config.session_id = session_id;
    }

    let session = TranscriptionSession::new(
        config,
        Box::new(source),
        Box::new(backend),
        Box::new(LexiconAnnotator::new()),
        Arc::new(StaticPermissions::granted()),
    );

    info!("Session ID: {}", session.session_id());

    let mut updates = session.subscribe();

    session.request_authorization().await;
    updates
        .wait_for(|s| s.authorization != AuthorizationState::Undetermined)
        .await?;

    session.start().await?;
    info!("Recording started, streaming audio...");

    // Follow observable state until the service sends a final result or the
    // user interrupts
    loop {
        tokio::select! {
            changed = updates.changed() => {
                changed?;
                let snapshot = updates.borrow_and_update().clone();

                if !snapshot.transcript.is_empty() {
                    info!("Transcript: {}", snapshot.transcript);
                }
                for annotation in &snapshot.annotations {
                    info!("  [{:?}] {}", annotation.kind, annotation.text);
                }

                if let SessionStatus::Stopped { reason } = &snapshot.status {
                    info!("Session stopped: {}", reason);
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping session...");
                session.stop("Stopped by user.").await;
                break;
            }
        }
    }

    // Print summary
    let snapshot = session.snapshot();
    info!("Final transcript: {}", snapshot.transcript);
    info!("Final annotations: {}", snapshot.annotations.len());
    for annotation in &snapshot.annotations {
        info!("  [{:?}] {}", annotation.kind, annotation.text);
    }

    Ok(())
}
