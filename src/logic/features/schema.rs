//! Feature Schema - the model's column order
//!
//! The bundle's `selected_features` fixes which columns the model consumes and
//! in what order. It is checked once against the canonical layout when the
//! bundle loads; afterwards requests only need presence and coercion checks.

use std::collections::HashSet;

use thiserror::Error;

use super::layout::{column_index, FeatureVector, FEATURE_COUNT};

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("selected_features is empty")]
    Empty,

    #[error("selected_features lists '{0}' more than once")]
    Duplicate(String),

    #[error("selected_features contains unknown column '{0}'")]
    UnknownColumn(String),

    #[error("selected_features has {actual} columns, expected {expected}")]
    WrongCount { expected: usize, actual: usize },
}

/// Ordered, validated list of model input columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    /// `layout_index[i]` is the canonical layout slot of `columns[i]`
    layout_index: Vec<usize>,
}

impl FeatureSchema {
    /// Validate `selected_features` against the canonical layout.
    /// The set must be exactly the layout's columns; the order is free.
    pub fn new(selected: Vec<String>) -> Result<Self, SchemaError> {
        if selected.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        let mut layout_index = Vec::with_capacity(selected.len());

        for column in &selected {
            if !seen.insert(column.as_str()) {
                return Err(SchemaError::Duplicate(column.clone()));
            }
            let idx = column_index(column)
                .ok_or_else(|| SchemaError::UnknownColumn(column.clone()))?;
            layout_index.push(idx);
        }

        if selected.len() != FEATURE_COUNT {
            return Err(SchemaError::WrongCount {
                expected: FEATURE_COUNT,
                actual: selected.len(),
            });
        }

        Ok(Self { columns: selected, layout_index })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reorder a canonical-layout vector into model column order
    pub fn align(&self, canonical: &FeatureVector) -> Vec<f32> {
        self.layout_index.iter().map(|&i| canonical[i] as f32).collect()
    }

    /// Selected columns absent from `present`, in model column order
    pub fn missing_from<'a, I>(&self, present: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: HashSet<&str> = present.into_iter().collect();
        self.columns
            .iter()
            .filter(|c| !present.contains(c.as_str()))
            .cloned()
            .collect()
    }
}
