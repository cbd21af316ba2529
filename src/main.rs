//! Flow Classifier Server
//!
//! Loads the model bundle once at startup and serves predictions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    FLOW CLASSIFIER                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────┐   ┌──────────────────┐   │
//! │  │  API      │──▶│  Feature   │──▶│  Classifier      │   │
//! │  │  (Axum)   │   │  Table     │   │  (GBDT / ONNX)   │   │
//! │  └───────────┘   └────────────┘   └────────┬─────────┘   │
//! │                                            ▼             │
//! │                                   ┌──────────────────┐   │
//! │                                   │  Label Encoder   │   │
//! │                                   └──────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flow_classifier::{
    config::{Config, LogFormat},
    constants::{APP_NAME, APP_VERSION},
    create_router,
    logic::bundle::ModelBundle,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_tracing(config.log_format);

    tracing::info!("{} v{} starting...", APP_NAME, APP_VERSION);

    // Load model bundle; the service does not start without it
    let bundle = ModelBundle::load(&config.bundle_path)
        .with_context(|| format!("Failed to load model bundle {}", config.bundle_path.display()))?;

    let meta = bundle.metadata();
    tracing::info!(
        kind = %meta.model_kind,
        checksum = %meta.checksum,
        classes = bundle.label_encoder().len(),
        features = bundle.schema().len(),
        "Model bundle loaded"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let app = create_router(AppState::new(bundle, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flow_classifier=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
