use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use voxtag::{create_router, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "voxtag", about = "Continuous transcription session service")]
struct Args {
    /// Path to the configuration file, without extension
    #[arg(short, long, default_value = "config/voxtag")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);
    info!("NATS server: {}", cfg.nats.url);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let app = create_router(AppState::new(cfg));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
