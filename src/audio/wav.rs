use anyhow::{bail, Context, Result};
use hound::WavReader;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::source::{AudioFrame, AudioSource, SourceConfig};

/// Audio source that streams a WAV file as timed frames
///
/// The file is delivered at its native sample format; `SourceConfig` only
/// controls the frame duration. By default frames are paced to real time so
/// a downstream recognizer sees a live-capture rhythm; `unpaced()` delivers
/// as fast as the consumer drains. The stream ends when the file is
/// exhausted, which a session treats like the microphone going quiet.
pub struct WavSource {
    path: PathBuf,
    config: SourceConfig,
    realtime: bool,
    task: Option<JoinHandle<()>>,
    open: bool,
}

impl WavSource {
    pub fn new(path: impl Into<PathBuf>, config: SourceConfig) -> Self {
        Self {
            path: path.into(),
            config,
            realtime: true,
            task: None,
            open: false,
        }
    }

    /// Deliver frames as fast as the consumer drains them (for tests/batch)
    pub fn unpaced(mut self) -> Self {
        self.realtime = false;
        self
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait::async_trait]
impl AudioSource for WavSource {
    async fn open(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.open {
            bail!("Audio source is already open");
        }

        // Read the whole file up front; WAV inputs here are short clips
        let reader = WavReader::open(&self.path)
            .with_context(|| format!("Failed to open WAV file: {}", self.path.display()))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "WAV source loaded: {} ({:.1}s, {}Hz, {} channels)",
            self.path.display(),
            duration_seconds,
            spec.sample_rate,
            spec.channels
        );

        let frame_ms = self.config.buffer_duration_ms.max(1);
        let samples_per_frame =
            ((spec.sample_rate as u64 * frame_ms / 1000) as usize * spec.channels as usize).max(1);
        let realtime = self.realtime;

        let (tx, rx) = mpsc::channel(100);

        self.task = Some(tokio::spawn(async move {
            let mut timestamp_ms = 0u64;

            for chunk in samples.chunks(samples_per_frame) {
                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate: spec.sample_rate,
                    channels: spec.channels,
                    timestamp_ms,
                };

                if tx.send(frame).await.is_err() {
                    break;
                }

                timestamp_ms += frame_ms;

                if realtime {
                    tokio::time::sleep(Duration::from_millis(frame_ms)).await;
                }
            }

            // Sender drops here; the stream ends once the file is exhausted
        }));

        self.open = true;

        Ok(rx)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        if self.open {
            info!("WAV source closed: {}", self.path.display());
        }

        self.open = false;

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}
