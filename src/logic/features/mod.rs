//! Features Module - input schema shared by both prediction endpoints

pub mod layout;
pub mod schema;

pub use layout::{
    FeatureSpec, FeatureVector, LayoutInfo,
    FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use schema::{FeatureSchema, SchemaError};
