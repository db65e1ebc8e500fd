use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use nba_predictor::api::{self, AppState};
use nba_predictor::config::Config;
use nba_predictor::db::Database;
use nba_predictor::model::{ModelBundle, PredictionEngine};
use nba_predictor::provider::{self, BallDontLie, GameService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    // Seed demo outcomes on a fresh install
    if db.result_count()? == 0 {
        db.seed_demo_records()?;
        info!("Seeded demo prediction results");
    }

    // Load the trained model bundle, if present
    let engine = match ModelBundle::load(&config.model_path) {
        Ok(bundle) => {
            info!(
                "Loaded model with {} features from {}",
                bundle.feature_columns.len(),
                config.model_path
            );
            PredictionEngine::new(Some(bundle))
        }
        Err(err) => {
            warn!(
                "No usable model at {} ({}); prediction endpoints will return 500",
                config.model_path, err
            );
            PredictionEngine::new(None)
        }
    };

    // Static fallback schedule
    let static_games = provider::load_static_games(&config.fallback_games_path);
    info!("Loaded {} static fallback games", static_games.len());

    // Live provider behind the fallback chain
    let api_key_configured = config.ball_api_key.is_some();
    let live = BallDontLie::new(
        config.ball_api_key.as_deref(),
        Some(&config.ball_api_url),
        Duration::from_secs(config.provider_timeout_secs),
    )?;
    let games = GameService::new(Arc::new(live), static_games);

    let state = AppState {
        engine,
        games,
        db,
        api_key_configured,
    };
    let app = api::router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
