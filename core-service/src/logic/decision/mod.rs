//! Decision Module
//!
//! Two-stage failure decision: stage-1 gate, stage-2 cause selection,
//! RNF fallback. This is where a feature vector becomes a `Verdict`.
//!
//! ## Structure
//! - `types`: FailureCode, FailureTypes, Verdict
//! - `policy`: thresholding and fallback rules
//! - `predictor`: engine facade holding both stages and the threshold store
//!
//! ## Usage
//! ```ignore
//! use failwatch_core::logic::decision::FailurePredictor;
//!
//! let verdict = predictor.predict(&features)?;
//! if verdict.failed {
//!     println!("{:?}", verdict.failure_types);
//! }
//! ```

pub mod types;
pub mod policy;
pub mod predictor;


pub use types::{round3, FailureCode, FailureTypes, Verdict};
pub use policy::{decide, decide_with_scores, select_failure_types, stage1_fires};
pub use predictor::FailurePredictor;
