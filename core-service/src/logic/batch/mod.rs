//! Batch Module - many predictions, partial-failure tolerant
//!
//! `results[i]` always answers `items[i]`. Failed items carry the degraded
//! placeholder verdict and a reason; the batch itself never fails.

pub mod types;
pub mod runner;


pub use types::{
    BatchHooks, BatchItem, BatchProgress, BatchReport, BatchResult, CancelFlag, ItemStatus,
};
pub use runner::BatchRunner;
