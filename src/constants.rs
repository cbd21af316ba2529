//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default model bundle location (relative to the working directory)
pub const DEFAULT_BUNDLE_PATH: &str = "model/bundle.json";

/// Default upload size limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Front-end confidence bands
pub const DEFAULT_CONFIDENCE_LOW: f64 = 0.6;
pub const DEFAULT_CONFIDENCE_MEDIUM: f64 = 0.85;

/// MIME type accepted by the batch endpoint
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Multipart field carrying the uploaded table
pub const CSV_FIELD_NAME: &str = "file";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Flow Classifier";
