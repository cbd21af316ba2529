//! Inference - feature matrix in, labelled predictions out
//!
//! Shared by both endpoints: one vectorized probability call per request,
//! then per-row argmax, label lookup and class-probability mapping.

use std::time::Instant;

use ndarray::{Array2, ArrayView1};

use crate::logic::bundle::ModelBundle;
use crate::logic::features::FeatureVector;
use crate::logic::model::{ModelError, Predictions};
use crate::models::{ClassProbabilities, PredictionResult};

/// Predict every row of a matrix already in the bundle's column order
pub fn predict_matrix(
    bundle: &ModelBundle,
    features: &Array2<f32>,
) -> Result<Vec<PredictionResult>, ModelError> {
    let start = Instant::now();
    let Predictions { class_ids, probabilities: proba } = bundle.model().predict(features)?;

    let classes = bundle.label_encoder().len();
    if proba.nrows() != features.nrows() || proba.ncols() != classes {
        return Err(ModelError::Inference(format!(
            "model returned a {}x{} probability matrix for {} rows and {} classes",
            proba.nrows(),
            proba.ncols(),
            features.nrows(),
            classes
        )));
    }

    let results = proba
        .rows()
        .into_iter()
        .zip(class_ids)
        .map(|(row, class_id)| label_row(bundle, row, class_id))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        rows = results.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Inference complete"
    );

    Ok(results)
}

/// Predict a single flow given in canonical layout order
pub fn predict_one(
    bundle: &ModelBundle,
    canonical: &FeatureVector,
) -> Result<PredictionResult, ModelError> {
    let aligned = bundle.schema().align(canonical);
    let features = Array2::from_shape_vec((1, aligned.len()), aligned)
        .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))?;

    predict_matrix(bundle, &features)?
        .pop()
        .ok_or_else(|| ModelError::Inference("model returned no prediction".to_string()))
}

fn label_row(
    bundle: &ModelBundle,
    row: ArrayView1<f32>,
    best: usize,
) -> Result<PredictionResult, ModelError> {
    if row.iter().any(|p| !p.is_finite()) {
        return Err(ModelError::Inference(format!("non-finite class probability in {:?}", row)));
    }

    let encoder = bundle.label_encoder();
    let prediction = encoder
        .inverse_transform(best)
        .ok_or_else(|| ModelError::Inference(format!("class id {} unknown to the label encoder", best)))?
        .to_string();

    let probabilities = encoder
        .classes()
        .iter()
        .zip(row.iter())
        .map(|(class, p)| (class.clone(), *p))
        .collect();

    Ok(PredictionResult {
        prediction,
        confidence: row[best],
        probabilities: ClassProbabilities::new(probabilities),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::bundle::LabelEncoder;
    use crate::logic::features::layout::canonical_columns;
    use crate::logic::features::FeatureSchema;
    use crate::logic::model::Classifier;
    use ndarray::array;

    /// Returns a fixed probability matrix, whatever the input
    struct FixedModel(Array2<f32>);

    impl Classifier for FixedModel {
        fn kind(&self) -> &'static str {
            "fixed"
        }
        fn n_features(&self) -> usize {
            10
        }
        fn n_classes(&self) -> usize {
            self.0.ncols()
        }
        fn predict_proba(&self, _features: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
            Ok(self.0.clone())
        }
    }

    fn bundle(proba: Array2<f32>) -> ModelBundle {
        ModelBundle::from_parts(
            Box::new(FixedModel(proba)),
            FeatureSchema::new(canonical_columns()).unwrap(),
            LabelEncoder::new(vec!["Normal".to_string(), "Malicious".to_string()]).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_labels_and_confidences() {
        let b = bundle(array![[0.2f32, 0.8], [0.9, 0.1]]);
        let results = predict_matrix(&b, &Array2::zeros((2, 10))).unwrap();

        assert_eq!(results[0].prediction, "Malicious");
        assert_eq!(results[0].confidence, 0.8);
        assert_eq!(results[1].prediction, "Normal");
        assert_eq!(results[1].confidence, 0.9);
        assert_eq!(results[1].probabilities.get("Malicious"), Some(0.1));
    }

    #[test]
    fn test_single_prediction() {
        let b = bundle(array![[0.1f32, 0.9]]);
        let result = predict_one(&b, &[0.0; 10]).unwrap();

        assert_eq!(result.prediction, "Malicious");
        assert_eq!(result.confidence, 0.9);
        let keys: Vec<&str> = result.probabilities.iter().map(|(c, _)| c).collect();
        assert_eq!(keys, vec!["Normal", "Malicious"]);
    }

    #[test]
    fn test_row_count_mismatch_is_error() {
        let b = bundle(array![[0.1f32, 0.9]]);
        assert!(predict_matrix(&b, &Array2::zeros((3, 10))).is_err());
    }

    #[test]
    fn test_nan_probability_is_error() {
        let b = bundle(array![[f32::NAN, 0.9]]);
        assert!(matches!(
            predict_one(&b, &[0.0; 10]),
            Err(ModelError::Inference(_))
        ));
    }
}
