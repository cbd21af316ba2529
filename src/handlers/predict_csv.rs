//! Batch (CSV) prediction handler

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{AppError, AppResult, AppState};
use crate::constants::CSV_FIELD_NAME;
use crate::logic::{inference, table};
use crate::logic::table::TableError;
use crate::models::BatchPredictionResponse;

/// The `file` part of the upload
struct CsvUpload {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Classify every row of an uploaded CSV. All rows succeed or none do.
pub async fn predict_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<BatchPredictionResponse>> {
    let locale = state.config.locale;

    let mut multipart = multipart.map_err(|rejection| {
        AppError::BadRequest(locale.invalid_request(&rejection.body_text()))
    })?;

    let upload = read_upload(&mut multipart, &state)
        .await?
        .ok_or_else(|| AppError::BadRequest(locale.empty_file()))?;

    table::validate_upload(&upload.file_name, upload.content_type.as_deref(), &upload.bytes)
        .map_err(|e| table_error(&state, e))?;

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        file = %upload.file_name,
        bytes = upload.bytes.len(),
        "CSV prediction request"
    );

    let start = Instant::now();
    let worker_state = state.clone();
    let bytes = upload.bytes;

    let results = tokio::task::spawn_blocking(move || {
        let bundle = &worker_state.bundle;
        let matrix = table::read_feature_matrix(&bytes, bundle.schema())
            .map_err(|e| table_error(&worker_state, e))?;
        inference::predict_matrix(bundle, &matrix).map_err(|e| worker_state.internal_error(e))
    })
    .await
    .map_err(|e| state.internal_error(e))??;

    tracing::info!(
        %request_id,
        rows = results.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "CSV prediction complete"
    );

    Ok(Json(BatchPredictionResponse { results }))
}

/// Find the `file` field; other fields are skipped
async fn read_upload(multipart: &mut Multipart, state: &AppState) -> AppResult<Option<CsvUpload>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(state, e))?
    {
        if field.name() != Some(CSV_FIELD_NAME) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(state, e))?;

        return Ok(Some(CsvUpload { file_name, content_type, bytes }));
    }

    Ok(None)
}

fn multipart_error(state: &AppState, err: MultipartError) -> AppError {
    let locale = state.config.locale;
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(locale.upload_too_large(state.config.max_upload_bytes))
    } else {
        AppError::BadRequest(locale.invalid_request(&err.body_text()))
    }
}

fn table_error(state: &AppState, err: TableError) -> AppError {
    if err.is_client_error() {
        AppError::BadRequest(err.client_message(state.config.locale))
    } else {
        state.internal_error(err)
    }
}
