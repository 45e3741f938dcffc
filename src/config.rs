use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub nats: NatsConfig,
    pub session: SessionDefaults,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub frame_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    pub audio_subject_prefix: String,
    pub transcript_subject: String,
}

/// Defaults applied to sessions created over HTTP
#[derive(Debug, Deserialize)]
pub struct SessionDefaults {
    pub annotation_period_ms: u64,
    pub authorization_timeout_secs: Option<u64>,
    pub backend_idle_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
