//! Engine Status
//!
//! Counters kept by the predictor and the snapshot served to the API.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::logic::features::LayoutInfo;

/// Per-engine counters. Relaxed ordering; these are for display only.
#[derive(Debug, Default)]
pub struct EngineStats {
    predictions: AtomicU64,
    failures: AtomicU64,
    inference_errors: AtomicU64,
    degraded_items: AtomicU64,
    batches: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_prediction(&self, failed: bool, elapsed_us: u64) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        if failed {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_error(&self) {
        self.inference_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self, degraded: u64) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.degraded_items.fetch_add(degraded, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let predictions = self.predictions.load(Ordering::Relaxed);
        let latency_sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg_latency_ms = if predictions > 0 {
            (latency_sum as f64 / predictions as f64) / 1000.0
        } else {
            0.0
        };

        StatsSnapshot {
            predictions,
            failures: self.failures.load(Ordering::Relaxed),
            inference_errors: self.inference_errors.load(Ordering::Relaxed),
            degraded_items: self.degraded_items.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            avg_latency_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub predictions: u64,
    pub failures: u64,
    pub inference_errors: u64,
    pub degraded_items: u64,
    pub batches: u64,
    pub avg_latency_ms: f64,
}

/// Engine status for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub version: String,
    pub layout: LayoutInfo,
    pub detector: String,
    pub classifier: String,
    pub stage1_threshold: f64,
    pub stats: StatsSnapshot,
}
