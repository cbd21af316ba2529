//! Network flow classifier
//!
//! Serves a pre-trained traffic classifier over HTTP. A flow is described by
//! ten numeric features; the model bundle names the subset it was trained on
//! and the class labels it emits.
//!
//! ```text
//!   GET  /             upload / manual entry page
//!   GET  /health       liveness + loaded model info
//!   POST /predict      one flow as JSON
//!   POST /predict_csv  many flows as a CSV upload
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod logic;
pub mod messages;
pub mod models;

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::logic::bundle::ModelBundle;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
    pub config: Config,
}

impl AppState {
    pub fn new(bundle: ModelBundle, config: Config) -> Self {
        Self {
            bundle: Arc::new(bundle),
            config,
        }
    }

    /// Log an unexpected failure and turn it into a 500. Detail is withheld
    /// from clients in production.
    pub fn internal_error(&self, detail: impl Display) -> AppError {
        let detail = detail.to_string();
        tracing::error!(error = %detail, "Internal error");

        let locale = self.config.locale;
        if self.config.is_production() {
            AppError::InternalError(locale.server_error_generic())
        } else {
            AppError::InternalError(locale.server_error(&detail))
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::ui::index))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict_csv", post(handlers::predict_csv::predict_csv))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
