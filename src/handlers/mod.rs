//! HTTP handlers

pub mod health;
pub mod predict;
pub mod predict_csv;
pub mod ui;
