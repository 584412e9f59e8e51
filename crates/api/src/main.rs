//! ComfyClaude Studio HTTP API.
//!
//! Serves learning modules, podcast episodes, trends and the screenshot inbox
//! as JSON, plus generated audio as static files.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use elevenlabs_speech::ElevenLabsSpeech;
use studio::{AudioStore, StudioContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, users = config.tokens.len(), "Starting ComfyClaude API");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Speech provider
    let speech = ElevenLabsSpeech::from_env()?;
    info!(model = %speech.config().model_id, "Speech provider ready");

    let audio = AudioStore::new(&config.audio_dir, &config.audio_public_prefix);
    tokio::fs::create_dir_all(audio.root()).await?;

    // Build application state
    let ctx = StudioContext::new(db, Arc::new(speech), audio, config.studio_settings());
    let state = AppState::new(ctx, config.tokens.clone());

    let app = routes::app(state);

    // Start server
    info!(addr = %config.addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
