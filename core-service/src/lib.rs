//! Failwatch Core - two-stage machine failure decision engine
//!
//! ```text
//! FeatureVector ─▶ Stage-1 detector ─▶ below threshold ─▶ Verdict (healthy)
//!                        │
//!                        ▼
//!                 Stage-2 classifier ─▶ per-code thresholds ─▶ RNF fallback ─▶ Verdict (failing)
//! ```

pub mod constants;
pub mod logic;

pub use logic::batch::{BatchHooks, BatchItem, BatchReport, BatchResult, BatchRunner, CancelFlag, ItemStatus};
pub use logic::config::{EngineConfig, StartupError};
pub use logic::decision::{FailureCode, FailurePredictor, FailureTypes, Verdict};
pub use logic::features::{FeatureVector, MachineType};
pub use logic::model::{ConfigError, InferenceError, ThresholdConfig, ThresholdStore};
pub use logic::status::EngineStatus;
