//! ONNX Runtime backend
//!
//! Runs a classifier exported to ONNX (e.g. `onnxmltools.convert_xgboost` or
//! `skl2onnx` with `zipmap=False`). The probability output must be a dense
//! float tensor of shape `[rows, classes]`.

use std::path::Path;

use ndarray::Array2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use super::{check_width, Classifier, ModelError};

/// Conventional name of the probability output of converted classifiers
const PROBABILITY_OUTPUT: &str = "probabilities";

/// ONNX model reference as stored in the bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxSpec {
    /// Model file, relative to the bundle file
    pub path: String,
    /// Output holding class probabilities. Defaults to `probabilities`,
    /// then to the last output of the graph.
    #[serde(default)]
    pub probability_output: Option<String>,
}

pub struct OnnxClassifier {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    output_name: String,
    n_features: usize,
    n_classes: usize,
}

impl OnnxClassifier {
    /// Load an ONNX model from file
    pub fn load(
        model_path: &Path,
        spec: &OnnxSpec,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Definition(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Definition(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelError::Definition(format!("Failed to load model: {}", e)))?;

        let outputs: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let output_name = select_output(&outputs, spec.probability_output.as_deref())?;

        tracing::info!("ONNX model loaded (probability output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            n_features,
            n_classes,
        })
    }
}

/// Pick the probability output among the graph outputs
fn select_output(outputs: &[String], requested: Option<&str>) -> Result<String, ModelError> {
    if let Some(name) = requested {
        return outputs
            .iter()
            .find(|o| o.as_str() == name)
            .cloned()
            .ok_or_else(|| ModelError::Definition(format!("model has no output named '{}'", name)));
    }

    outputs
        .iter()
        .find(|o| o.as_str() == PROBABILITY_OUTPUT)
        .or_else(|| outputs.last())
        .cloned()
        .ok_or_else(|| ModelError::Definition("No output defined".to_string()))
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        check_width(features, self.n_features)?;
        let rows = features.nrows();

        let input_tensor = Value::from_array(features.clone())
            .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ModelError::Inference(format!("No output '{}'", self.output_name)))?;

        let (_, data) = output.try_extract_tensor::<f32>().map_err(|e| {
            ModelError::Inference(format!(
                "Extract error: {} (export the model with a tensor probability output)",
                e
            ))
        })?;

        if data.len() != rows * self.n_classes {
            return Err(ModelError::Inference(format!(
                "probability output has {} values, expected {} rows x {} classes",
                data.len(),
                rows,
                self.n_classes
            )));
        }

        Array2::from_shape_vec((rows, self.n_classes), data.to_vec())
            .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_conventional_output() {
        let outputs = names(&["label", "probabilities"]);
        assert_eq!(select_output(&outputs, None).unwrap(), "probabilities");
    }

    #[test]
    fn test_select_falls_back_to_last() {
        let outputs = names(&["output_label", "output_probability"]);
        assert_eq!(select_output(&outputs, None).unwrap(), "output_probability");
    }

    #[test]
    fn test_select_requested() {
        let outputs = names(&["label", "probs"]);
        assert_eq!(select_output(&outputs, Some("probs")).unwrap(), "probs");
        assert!(select_output(&outputs, Some("missing")).is_err());
        assert!(select_output(&[], None).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let spec = OnnxSpec { path: "nope.onnx".to_string(), probability_output: None };
        let result = OnnxClassifier::load(Path::new("/nonexistent/nope.onnx"), &spec, 10, 3);
        assert!(matches!(result, Err(ModelError::NotFound(_))));
    }
}
