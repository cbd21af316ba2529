//! Model Module - classifier backends
//!
//! The trained model is opaque to the rest of the service: anything that can
//! turn a feature matrix into a probability matrix implements [`Classifier`].

pub mod gbdt;
pub mod onnx;

use ndarray::{Array2, ArrayView1};
use thiserror::Error;

pub use gbdt::{GbdtSpec, TreeEnsemble};
pub use onnx::{OnnxClassifier, OnnxSpec};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model expects {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("invalid model definition: {0}")]
    Definition(String),

    #[error("model file not found: {0}")]
    NotFound(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Output of one vectorized prediction call
#[derive(Debug, Clone)]
pub struct Predictions {
    /// Class id per row (probability argmax)
    pub class_ids: Vec<usize>,
    /// One row per sample, one column per class id
    pub probabilities: Array2<f32>,
}

/// A multi-class probabilistic classifier over a dense feature matrix.
///
/// Rows are samples, columns follow the bundle's `selected_features` order.
/// `predict_proba` returns one row per sample and one column per class id.
pub trait Classifier: Send + Sync {
    /// Short backend name, reported by `/health`
    fn kind(&self) -> &'static str;

    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    fn predict_proba(&self, features: &Array2<f32>) -> Result<Array2<f32>, ModelError>;

    /// Class ids and probabilities from a single `predict_proba` call
    fn predict(&self, features: &Array2<f32>) -> Result<Predictions, ModelError> {
        let probabilities = self.predict_proba(features)?;
        let class_ids = probabilities.rows().into_iter().map(argmax).collect();
        Ok(Predictions { class_ids, probabilities })
    }
}

/// Index of the largest probability; the first one wins on ties and NaN
/// entries never win.
pub fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    let mut best_val = f32::NEG_INFINITY;
    for (i, &v) in row.iter().enumerate() {
        if v > best_val {
            best = i;
            best_val = v;
        }
    }
    best
}

/// Reject matrices whose width does not match the model
pub(crate) fn check_width(features: &Array2<f32>, expected: usize) -> Result<(), ModelError> {
    let actual = features.ncols();
    if actual != expected {
        return Err(ModelError::FeatureMismatch { expected, actual });
    }
    Ok(())
}
