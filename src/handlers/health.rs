//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;
use crate::logic::features::LayoutInfo;

#[derive(Serialize)]
pub struct ModelInfo {
    kind: &'static str,
    source: String,
    checksum: String,
    loaded_at: DateTime<Utc>,
    classes: Vec<String>,
    selected_features: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    layout: LayoutInfo,
    model: ModelInfo,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let bundle = &state.bundle;
    let meta = bundle.metadata();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().timestamp(),
        layout: LayoutInfo::current(),
        model: ModelInfo {
            kind: meta.model_kind,
            source: meta.source.clone(),
            checksum: meta.checksum.clone(),
            loaded_at: meta.loaded_at,
            classes: bundle.label_encoder().classes().to_vec(),
            selected_features: bundle.schema().columns().to_vec(),
        },
    })
}
