use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Capture configuration for an audio source
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Target sample rate in Hz
    pub sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Frame size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz, what most STT models expect
            channels: 1,        // Mono
            buffer_duration_ms: 100,
        }
    }
}

/// Live audio capture source
///
/// Implementations deliver frames through a channel until the source is
/// closed. Shipped implementations:
/// - `PushSource`: fed by an in-process producer (tests, embedding apps)
/// - `WavSource`: streams a WAV file, optionally paced to real time
#[async_trait::async_trait]
pub trait AudioSource: Send + Sync {
    /// Open the capture stream
    ///
    /// Returns a channel receiver that will receive audio frames until the
    /// source is closed or the producer runs out of audio.
    async fn open(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Close the capture stream and stop frame delivery
    ///
    /// Safe to call repeatedly, including before `open`.
    async fn close(&mut self) -> Result<()>;

    /// Check if the source is currently open
    fn is_open(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Audio source fed by an external producer through an in-memory channel
///
/// The producer keeps the `PushHandle` and pushes frames at its own pace;
/// dropping the handle ends the stream. Frames pushed after `close` are
/// discarded rather than delivered.
///
/// Single-use: `close` consumes the feed, so a later `open` is refused.
/// Create a fresh source per recording (unlike [`WavSource`](super::WavSource),
/// which reopens from the start of its file).
pub struct PushSource {
    feed: Option<mpsc::Receiver<AudioFrame>>,
    relay: Option<JoinHandle<()>>,
    open: bool,
}

/// Producer side of a `PushSource`
#[derive(Clone)]
pub struct PushHandle {
    tx: mpsc::Sender<AudioFrame>,
}

impl PushHandle {
    /// Push one frame into the source
    pub async fn push(&self, frame: AudioFrame) -> Result<()> {
        if self.tx.send(frame).await.is_err() {
            bail!("Push source has shut down");
        }
        Ok(())
    }

    /// Signal end of audio. Dropping the handle has the same effect.
    pub fn finish(self) {}
}

impl PushSource {
    /// Create a push source and the handle that feeds it
    pub fn new() -> (Self, PushHandle) {
        let (tx, rx) = mpsc::channel(100);

        let source = Self {
            feed: Some(rx),
            relay: None,
            open: false,
        };

        (source, PushHandle { tx })
    }
}

#[async_trait::async_trait]
impl AudioSource for PushSource {
    async fn open(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.open {
            bail!("Audio source is already open");
        }

        let mut feed = self
            .feed
            .take()
            .context("Push source cannot be reopened after close")?;

        let (out_tx, out_rx) = mpsc::channel(100);

        // Relay instead of handing the feed out directly, so close() can cut
        // delivery even while producer handles are still alive
        self.relay = Some(tokio::spawn(async move {
            while let Some(frame) = feed.recv().await {
                if out_tx.send(frame).await.is_err() {
                    break;
                }
            }
        }));

        self.open = true;

        info!("Push source opened");

        Ok(out_rx)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }

        if self.open {
            info!("Push source closed");
        }

        self.open = false;

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn name(&self) -> &str {
        "push"
    }
}
