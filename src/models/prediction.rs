//! Prediction models - response bodies of both prediction endpoints

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Class name -> probability, kept in label-encoder order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassProbabilities(Vec<(String, f32)>);

impl ClassProbabilities {
    pub fn new(entries: Vec<(String, f32)>) -> Self {
        Self(entries)
    }

    pub fn get(&self, class: &str) -> Option<f32> {
        self.0.iter().find(|(c, _)| c == class).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(c, p)| (c.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (class, p) in &self.0 {
            map.serialize_entry(class, p)?;
        }
        map.end()
    }
}

/// Prediction for one flow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: String,
    /// Probability of `prediction`, the largest entry of `probabilities`
    pub confidence: f32,
    pub probabilities: ClassProbabilities,
}

/// Body of a successful `POST /predict_csv`
#[derive(Debug, Clone, Serialize)]
pub struct BatchPredictionResponse {
    pub results: Vec<PredictionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_keep_encoder_order() {
        let probs = ClassProbabilities::new(vec![
            ("PortScan".to_string(), 0.1),
            ("BENIGN".to_string(), 0.7),
            ("DDoS".to_string(), 0.2),
        ]);
        let json = serde_json::to_string(&probs).unwrap();
        assert_eq!(json, r#"{"PortScan":0.1,"BENIGN":0.7,"DDoS":0.2}"#);
        assert_eq!(probs.get("BENIGN"), Some(0.7));
        assert_eq!(probs.get("Bot"), None);
    }

    #[test]
    fn test_result_shape() {
        let result = PredictionResult {
            prediction: "BENIGN".to_string(),
            confidence: 0.7,
            probabilities: ClassProbabilities::new(vec![("BENIGN".to_string(), 0.7)]),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["prediction"], "BENIGN");
        assert!(value["confidence"].is_number());
        assert!(value["probabilities"].is_object());
    }
}
