//! HTTP handlers

pub mod health;
pub mod predict;
pub mod batch;
pub mod thresholds;
pub mod status;
