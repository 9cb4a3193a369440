//! Logic Module - Decision engine
//!
//! - `features/` - model input schema
//! - `model/` - stage contracts, ONNX adapters, thresholds
//! - `decision/` - two-stage decision policy and predictor
//! - `batch/` - batch runner with per-item fault isolation
//! - `status` - engine counters
//! - `config` - engine configuration and startup

pub mod features;
pub mod model;
pub mod decision;
pub mod batch;
pub mod status;
pub mod config;
