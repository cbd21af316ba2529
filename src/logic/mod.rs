//! Logic Module - everything between a parsed request and a prediction

pub mod bundle;
pub mod features;
pub mod inference;
pub mod model;
pub mod table;
