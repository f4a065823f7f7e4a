//! DSP Block API Server
//!
//! HTTP harness around the feature engine: describes the block, runs single
//! windows (with optional graphs) and batches of windows.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use feature_engine::{BlockDescriptor, FeatureExtractor, FeatureOptions};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::{
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

pub mod config;
pub mod routes;

pub use crate::config::{ConfigError, ServerConfig};

/// Application state shared across handlers
pub struct AppState {
    /// Feature pipeline
    pub extractor: FeatureExtractor,
    /// Published block description
    pub descriptor: BlockDescriptor,
    /// Version string
    pub version: String,
}

impl AppState {
    /// Create state around an extractor
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self {
            extractor,
            descriptor: BlockDescriptor::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Build the extractor described by the server configuration
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let rasterizer = config.rasterizer()?;
        if !rasterizer.has_font() {
            debug!("No font_path configured, captions use the built-in bitmap font");
        }
        let extractor = FeatureExtractor::with_rasterizer(FeatureOptions::default(), rasterizer)?;
        Ok(Self::new(extractor))
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(routes::info::index))
        .route("/parameters", get(routes::info::parameters))
        .route("/run", post(routes::run::run))
        .route("/batch", post(routes::batch::batch))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the global subscriber; fails if one is already installed
pub fn init_logging(config: &ServerConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.log_json {
        builder.json().finish().try_init()
    } else {
        builder.finish().try_init()
    }
}

/// Run the server until Ctrl-C
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_router(state, config.max_body_bytes);

    let addr = config.bind_addr();
    info!("Starting DSP block server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
