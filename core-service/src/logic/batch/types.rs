//! Batch Types

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::decision::Verdict;
use crate::logic::features::FeatureVector;

// ============================================================================
// INPUT
// ============================================================================

/// A feature vector tagged with a caller-chosen identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub id: String,
    pub features: FeatureVector,
}

impl BatchItem {
    pub fn new(id: impl Into<String>, features: FeatureVector) -> Self {
        Self { id: id.into(), features }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// How an item's verdict was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Real verdict from both stages
    Scored,
    /// Inference failed, placeholder verdict substituted
    Degraded { reason: String },
    /// Never started because the batch was cancelled
    Cancelled,
}

/// One output row, same position as its input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub id: String,
    #[serde(flatten)]
    pub verdict: Verdict,
    #[serde(flatten)]
    pub status: ItemStatus,
}

impl BatchResult {
    pub fn scored(id: String, verdict: Verdict) -> Self {
        Self { id, verdict, status: ItemStatus::Scored }
    }

    pub fn degraded(id: String, reason: String) -> Self {
        Self { id, verdict: Verdict::degraded(), status: ItemStatus::Degraded { reason } }
    }

    pub fn cancelled(id: String) -> Self {
        Self { id, verdict: Verdict::degraded(), status: ItemStatus::Cancelled }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ItemStatus::Degraded { .. })
    }
}

/// Whole-batch outcome. `results[i]` always belongs to input `i`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub failed: usize,
    pub degraded: usize,
    pub cancelled: usize,
    pub results: Vec<BatchResult>,
}

impl BatchReport {
    pub(crate) fn from_results(started_at: DateTime<Utc>, results: Vec<BatchResult>) -> Self {
        let failed = results.iter().filter(|r| r.verdict.failed).count();
        let degraded = results.iter().filter(|r| r.is_degraded()).count();
        let cancelled = results
            .iter()
            .filter(|r| r.status == ItemStatus::Cancelled)
            .count();

        Self {
            batch_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            total: results.len(),
            failed,
            degraded,
            cancelled,
            results,
        }
    }
}

// ============================================================================
// CONTROL
// ============================================================================

/// Progress after each finished item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

/// Shared cancellation switch. Cancelling stops scheduling; items already
/// running finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Optional hooks for one batch run
#[derive(Default)]
pub struct BatchHooks {
    pub cancel: Option<CancelFlag>,
    pub progress: Option<Box<dyn Fn(BatchProgress) + Send + Sync>>,
}

impl BatchHooks {
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(BatchProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancelFlag::is_cancelled)
    }
}
