//! Features Module - Model input schema
//!
//! The feature layout both stage models are trained against, and the
//! `FeatureVector` record the engine consumes.

pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

pub use layout::{check_input_shape, LayoutInfo, LayoutMismatch, FEATURE_COUNT, FEATURE_LAYOUT};
pub use vector::{FeatureVector, MachineType};
