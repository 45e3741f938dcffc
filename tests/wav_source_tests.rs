// Integration tests for the WAV-backed audio source
//
// These tests write small WAV fixtures to a temp directory and verify the
// source delivers them as correctly framed, correctly timestamped audio.

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::PathBuf;
use tempfile::TempDir;
use voxtag::{AudioSource, SourceConfig, WavSource};

fn write_wav(
    dir: &TempDir,
    name: &str,
    total_samples: usize,
    sample_rate: u32,
    channels: u16,
) -> Result<PathBuf> {
    let path = dir.path().join(name);

    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(&path, spec)?;
    for i in 0..total_samples {
        writer.write_sample((i % 100) as i16)?;
    }
    writer.finalize()?;

    Ok(path)
}

fn test_source_config() -> SourceConfig {
    SourceConfig {
        sample_rate: 16000,
        channels: 1,
        buffer_duration_ms: 100,
    }
}

#[tokio::test]
async fn test_wav_source_streams_all_samples() -> Result<()> {
    let dir = TempDir::new()?;
    // 0.5s of 16kHz mono = 8000 samples = 5 frames of 100ms
    let path = write_wav(&dir, "half-second.wav", 8000, 16000, 1)?;

    let mut source = WavSource::new(&path, test_source_config()).unpaced();
    let mut rx = source.open().await?;

    let mut frames = Vec::new();
    while let Some(frame) = rx.recv().await {
        frames.push(frame);
    }

    assert_eq!(frames.len(), 5, "8000 samples should split into 5 frames");

    let total: usize = frames.iter().map(|f| f.samples.len()).sum();
    assert_eq!(total, 8000, "Every sample must be delivered");

    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.sample_rate, 16000);
        assert_eq!(frame.channels, 1);
        assert_eq!(
            frame.timestamp_ms,
            i as u64 * 100,
            "Frame timestamps should advance by the frame duration"
        );
    }

    source.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_wav_source_partial_last_frame() -> Result<()> {
    let dir = TempDir::new()?;
    // 8800 samples = 5 full frames of 1600 plus a 800-sample tail
    let path = write_wav(&dir, "tail.wav", 8800, 16000, 1)?;

    let mut source = WavSource::new(&path, test_source_config()).unpaced();
    let mut rx = source.open().await?;

    let mut frames = Vec::new();
    while let Some(frame) = rx.recv().await {
        frames.push(frame);
    }

    assert_eq!(frames.len(), 6);
    assert_eq!(frames[4].samples.len(), 1600);
    assert_eq!(frames[5].samples.len(), 800, "Tail frame keeps the leftover");

    source.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_wav_source_preserves_stereo_interleaving() -> Result<()> {
    let dir = TempDir::new()?;
    // Stereo doubles the samples per frame
    let path = write_wav(&dir, "stereo.wav", 6400, 16000, 2)?;

    let mut source = WavSource::new(&path, test_source_config()).unpaced();
    let mut rx = source.open().await?;

    let first = rx.recv().await.expect("stereo file should produce frames");
    assert_eq!(first.channels, 2);
    assert_eq!(
        first.samples.len(),
        3200,
        "100ms of 16kHz stereo is 3200 interleaved samples"
    );

    source.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_wav_source_missing_file() {
    let mut source = WavSource::new("/nonexistent/audio.wav", test_source_config());

    let result = source.open().await;
    assert!(result.is_err(), "Opening a missing file should fail");
    assert!(!source.is_open());
}

#[tokio::test]
async fn test_wav_source_open_close_lifecycle() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_wav(&dir, "lifecycle.wav", 1600, 16000, 1)?;

    let mut source = WavSource::new(&path, test_source_config()).unpaced();
    assert!(!source.is_open());

    let _rx = source.open().await?;
    assert!(source.is_open());

    let second = source.open().await;
    assert!(second.is_err(), "Double open must be refused");

    source.close().await?;
    assert!(!source.is_open());

    // Close is safe to repeat
    source.close().await?;

    Ok(())
}

#[tokio::test]
async fn test_wav_source_reopens_after_close() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_wav(&dir, "reopen.wav", 3200, 16000, 1)?;

    let mut source = WavSource::new(&path, test_source_config()).unpaced();

    let mut rx = source.open().await?;
    let mut first_run = 0;
    while let Some(frame) = rx.recv().await {
        first_run += frame.samples.len();
    }
    source.close().await?;

    // A fresh open re-reads the file from the start
    let mut rx = source.open().await?;
    let mut second_run = 0;
    while let Some(frame) = rx.recv().await {
        second_run += frame.samples.len();
    }
    source.close().await?;

    assert_eq!(first_run, 3200);
    assert_eq!(second_run, 3200, "Reopen should deliver the whole file again");

    Ok(())
}

#[tokio::test]
async fn test_wav_source_close_stops_delivery() -> Result<()> {
    let dir = TempDir::new()?;
    // Big enough that the paced stream is still mid-file when we close
    let path = write_wav(&dir, "paced.wav", 160_000, 16000, 1)?;

    let mut source = WavSource::new(&path, test_source_config());
    let mut rx = source.open().await?;

    let first = rx.recv().await;
    assert!(first.is_some(), "Paced stream should deliver a first frame");

    source.close().await?;

    // The feeding task is gone; the channel drains whatever was buffered
    // and then closes
    let mut remaining = 0;
    while rx.recv().await.is_some() {
        remaining += 1;
        assert!(remaining < 200, "Stream must close after close()");
    }

    Ok(())
}
