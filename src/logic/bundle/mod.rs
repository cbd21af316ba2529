//! Model Bundle - the deployed model artifact
//!
//! A bundle is one JSON file holding everything needed to serve predictions:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "selected_features": ["Destination Port", "..."],
//!   "label_encoder": { "classes": ["BENIGN", "DDoS", "PortScan"] },
//!   "model": { "type": "gbdt", "objective": "multi:softprob", "num_class": 3, "trees": [] }
//! }
//! ```
//!
//! `model` may instead be `{"type": "onnx", "path": "model.onnx"}`, resolved
//! next to the bundle file. The bundle is loaded once at startup and is
//! immutable afterwards.

pub mod encoder;


use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::logic::features::{FeatureSchema, SchemaError};
use crate::logic::model::{Classifier, GbdtSpec, ModelError, OnnxClassifier, OnnxSpec, TreeEnsemble};

pub use encoder::{LabelEncoder, LabelEncoderSpec};

/// Bundle format understood by this build
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("cannot read bundle {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bundle is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported bundle format version {0} (supported: {})", BUNDLE_FORMAT_VERSION)]
    UnsupportedVersion(u32),

    #[error("invalid selected_features: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid label encoder: {0}")]
    Encoder(String),

    #[error("invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("model outputs {model} classes but the label encoder knows {encoder}")]
    ClassCountMismatch { model: usize, encoder: usize },

    #[error("model takes {model} features but selected_features lists {selected}")]
    FeatureCountMismatch { model: usize, selected: usize },
}

// ============================================================================
// SERIALIZED FORM
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSpec {
    Gbdt(GbdtSpec),
    Onnx(OnnxSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleFile {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub selected_features: Vec<String>,
    pub label_encoder: LabelEncoderSpec,
    pub model: ModelSpec,
}

fn default_format_version() -> u32 {
    BUNDLE_FORMAT_VERSION
}

// ============================================================================
// LOADED BUNDLE
// ============================================================================

/// Where a bundle came from, reported by `/health`
#[derive(Debug, Clone, Serialize)]
pub struct BundleMetadata {
    pub source: String,
    /// SHA-256 of the bundle file bytes
    pub checksum: String,
    pub model_kind: &'static str,
    pub loaded_at: DateTime<Utc>,
}

pub struct ModelBundle {
    model: Box<dyn Classifier>,
    schema: FeatureSchema,
    label_encoder: LabelEncoder,
    metadata: BundleMetadata,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("model", &self.model.kind())
            .field("selected_features", &self.schema.columns())
            .field("classes", &self.label_encoder.classes())
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl ModelBundle {
    /// Read and validate the bundle at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        tracing::info!("Loading model bundle from: {}", path.display());

        let bytes = fs::read(path).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let bundle = Self::from_slice(&bytes, &base_dir, &path.display().to_string())?;

        tracing::info!(
            kind = bundle.metadata.model_kind,
            checksum = %bundle.metadata.checksum,
            classes = ?bundle.label_encoder.classes(),
            "Model bundle loaded"
        );

        Ok(bundle)
    }

    /// Parse bundle bytes. Relative ONNX paths resolve against `base_dir`.
    pub fn from_slice(bytes: &[u8], base_dir: &Path, source: &str) -> Result<Self, BundleError> {
        let file: BundleFile = serde_json::from_slice(bytes)?;

        if file.format_version != BUNDLE_FORMAT_VERSION {
            return Err(BundleError::UnsupportedVersion(file.format_version));
        }

        let schema = FeatureSchema::new(file.selected_features)?;
        let label_encoder = LabelEncoder::try_from(file.label_encoder)?;

        let model: Box<dyn Classifier> = match &file.model {
            ModelSpec::Gbdt(spec) => Box::new(TreeEnsemble::from_spec(spec, &schema)?),
            ModelSpec::Onnx(spec) => {
                let model_path = resolve_model_path(base_dir, &spec.path);
                Box::new(OnnxClassifier::load(
                    &model_path,
                    spec,
                    schema.len(),
                    label_encoder.len(),
                )?)
            }
        };

        let metadata = BundleMetadata {
            source: source.to_string(),
            checksum: hex::encode(Sha256::digest(bytes)),
            model_kind: model.kind(),
            loaded_at: Utc::now(),
        };

        Self::assemble(model, schema, label_encoder, metadata)
    }

    /// Build a bundle around an already-constructed classifier
    pub fn from_parts(
        model: Box<dyn Classifier>,
        schema: FeatureSchema,
        label_encoder: LabelEncoder,
    ) -> Result<Self, BundleError> {
        let metadata = BundleMetadata {
            source: "<memory>".to_string(),
            checksum: String::new(),
            model_kind: model.kind(),
            loaded_at: Utc::now(),
        };
        Self::assemble(model, schema, label_encoder, metadata)
    }

    fn assemble(
        model: Box<dyn Classifier>,
        schema: FeatureSchema,
        label_encoder: LabelEncoder,
        metadata: BundleMetadata,
    ) -> Result<Self, BundleError> {
        if model.n_classes() != label_encoder.len() {
            return Err(BundleError::ClassCountMismatch {
                model: model.n_classes(),
                encoder: label_encoder.len(),
            });
        }
        if model.n_features() != schema.len() {
            return Err(BundleError::FeatureCountMismatch {
                model: model.n_features(),
                selected: schema.len(),
            });
        }

        Ok(Self { model, schema, label_encoder, metadata })
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    /// The model's input columns, in order
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }
}

fn resolve_model_path(base_dir: &Path, model_path: &str) -> PathBuf {
    let p = Path::new(model_path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
