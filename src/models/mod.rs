//! Request and response models

pub mod flow;
pub mod prediction;

pub use flow::*;
pub use prediction::*;
