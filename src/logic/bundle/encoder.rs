//! Label encoder - class id <-> class name

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::BundleError;

/// Serialized form: `{"classes": ["BENIGN", "DDoS", ...]}`, index = class id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoderSpec {
    pub classes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, BundleError> {
        if classes.len() < 2 {
            return Err(BundleError::Encoder(format!(
                "need at least 2 classes, got {}",
                classes.len()
            )));
        }

        let mut seen = HashSet::with_capacity(classes.len());
        for (id, name) in classes.iter().enumerate() {
            if name.is_empty() {
                return Err(BundleError::Encoder(format!("class {} has an empty name", id)));
            }
            if !seen.insert(name.as_str()) {
                return Err(BundleError::Encoder(format!("class '{}' listed twice", name)));
            }
        }

        Ok(Self { classes })
    }

    /// All class names, ordered by class id
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class id -> class name
    pub fn inverse_transform(&self, id: usize) -> Option<&str> {
        self.classes.get(id).map(String::as_str)
    }
}

impl TryFrom<LabelEncoderSpec> for LabelEncoder {
    type Error = BundleError;

    fn try_from(spec: LabelEncoderSpec) -> Result<Self, Self::Error> {
        Self::new(spec.classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_inverse_transform() {
        let enc = LabelEncoder::new(classes(&["BENIGN", "DDoS", "PortScan"])).unwrap();
        assert_eq!(enc.len(), 3);
        assert_eq!(enc.inverse_transform(1), Some("DDoS"));
        assert_eq!(enc.inverse_transform(2), Some("PortScan"));
        assert_eq!(enc.inverse_transform(3), None);
    }

    #[test]
    fn test_rejects_bad_class_lists() {
        assert!(LabelEncoder::new(classes(&["BENIGN"])).is_err());
        assert!(LabelEncoder::new(classes(&["BENIGN", "BENIGN"])).is_err());
        assert!(LabelEncoder::new(classes(&["BENIGN", ""])).is_err());
    }
}
