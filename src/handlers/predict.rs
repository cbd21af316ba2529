//! Single-record prediction handler

use axum::{extract::State, Json};

use crate::{AppState, AppResult};
use crate::extract::ValidJson;
use crate::logic::inference;
use crate::models::{FlowRecord, PredictionResult};

/// Classify one hand-entered flow
pub async fn predict(
    State(state): State<AppState>,
    ValidJson(record): ValidJson<FlowRecord>,
) -> AppResult<Json<PredictionResult>> {
    let canonical = record.to_feature_vector();
    let bundle = state.bundle.clone();

    let result = tokio::task::spawn_blocking(move || inference::predict_one(&bundle, &canonical))
        .await
        .map_err(|e| state.internal_error(e))?
        .map_err(|e| state.internal_error(e))?;

    tracing::debug!(
        prediction = %result.prediction,
        confidence = result.confidence,
        "Single flow classified"
    );

    Ok(Json(result))
}
