//! Uploaded table validation
//!
//! Turns an uploaded CSV into a feature matrix in the model's column order.
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. file name ends in `.csv` (any case)
//! 2. declared content type is exactly `text/csv`
//! 3. payload is not empty
//! 4. payload parses and has at least one data row
//! 5. every selected feature column is present
//! 6. every selected column coerces to floating point
//!
//! Cells are read as text and parsed per column, so a value that is a valid
//! float is accepted whatever width or padding it has.

use std::io::Cursor;

use ndarray::Array2;
use polars::prelude::*;
use thiserror::Error;

use crate::constants::CSV_MIME_TYPE;
use crate::logic::features::FeatureSchema;
use crate::messages::Locale;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("file name '{0}' does not end in .csv")]
    WrongExtension(String),

    #[error("content type '{0}' is not text/csv")]
    WrongContentType(String),

    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("table has no data rows")]
    NoData,

    #[error("missing feature columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("column '{column}' is not numeric: {detail}")]
    Coercion { column: String, detail: String },

    #[error("cannot read CSV: {0}")]
    Unreadable(String),
}

impl TableError {
    /// Input-content problems the client can fix; everything else is ours
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TableError::Unreadable(_))
    }

    /// Message for the `error` field of the response
    pub fn client_message(&self, locale: Locale) -> String {
        match self {
            TableError::WrongExtension(_) => locale.wrong_extension(),
            TableError::WrongContentType(ct) => locale.wrong_mime_type(ct),
            TableError::EmptyFile => locale.empty_file(),
            TableError::NoData => locale.no_data(),
            TableError::MissingColumns(cols) => locale.missing_features(cols),
            TableError::Coercion { detail, .. } => locale.type_conversion(detail),
            TableError::Unreadable(detail) => locale.server_error(detail),
        }
    }
}

/// Checks 1-3: everything that can be decided without parsing
pub fn validate_upload(
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<(), TableError> {
    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(TableError::WrongExtension(file_name.to_string()));
    }

    let declared = content_type.unwrap_or_default();
    if declared != CSV_MIME_TYPE {
        return Err(TableError::WrongContentType(declared.to_string()));
    }

    if bytes.is_empty() {
        return Err(TableError::EmptyFile);
    }

    Ok(())
}

/// Checks 4-6: parse, then extract the selected columns as `f32`.
/// Empty (or blank) cells become NaN; surrounding whitespace is ignored.
pub fn read_feature_matrix(bytes: &[u8], schema: &FeatureSchema) -> Result<Array2<f32>, TableError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(TableError::NoData);
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| TableError::Unreadable(e.to_string()))?;

    if df.height() == 0 {
        return Err(TableError::NoData);
    }

    let names = df.get_column_names();
    let missing = schema.missing_from(names.iter().map(|c| c.as_str()));
    if !missing.is_empty() {
        return Err(TableError::MissingColumns(missing));
    }

    let mut matrix = Array2::<f32>::zeros((df.height(), schema.len()));

    for (j, name) in schema.columns().iter().enumerate() {
        let series = df
            .column(name)
            .map_err(|e| TableError::Unreadable(e.to_string()))?
            .as_materialized_series()
            .rechunk();

        let cells = series
            .str()
            .map_err(|e| TableError::Unreadable(e.to_string()))?;

        let mut rejected = Vec::new();
        for (i, cell) in cells.into_iter().enumerate() {
            matrix[[i, j]] = match cell.map(str::trim) {
                None | Some("") => f32::NAN,
                Some(text) => match text.parse::<f64>() {
                    Ok(v) => v as f32,
                    Err(_) => {
                        rejected.push(text.to_string());
                        f32::NAN
                    }
                },
            };
        }

        if !rejected.is_empty() {
            return Err(TableError::Coercion {
                column: name.clone(),
                detail: coercion_detail(name, &rejected, df.height()),
            });
        }
    }

    Ok(matrix)
}

fn coercion_detail(column: &str, rejected: &[String], rows: usize) -> String {
    let sample: Vec<&str> = rejected.iter().take(5).map(String::as_str).collect();
    format!(
        "conversion from `str` to `f64` failed in column '{}' for {} out of {} values: {:?}",
        column,
        rejected.len(),
        rows,
        sample
    )
}
