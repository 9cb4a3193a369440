//! Batch Runner
//!
//! Applies the predictor to many items. A failing item is replaced with the
//! degraded placeholder and logged; it never aborts the batch.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::logic::decision::FailurePredictor;
use super::types::{BatchHooks, BatchItem, BatchProgress, BatchReport, BatchResult};

/// Runs batches sequentially or on a bounded rayon pool
pub struct BatchRunner {
    pool: Option<ThreadPool>,
    workers: usize,
}

impl BatchRunner {
    /// `workers <= 1` runs items one after another on the calling thread
    pub fn new(workers: usize) -> Self {
        if workers <= 1 {
            return Self::sequential();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("failwatch-batch-{}", i))
            .build()
        {
            Ok(pool) => Self { pool: Some(pool), workers },
            Err(e) => {
                log::warn!("Batch pool with {} workers unavailable ({}), running sequentially", workers, e);
                Self::sequential()
            }
        }
    }

    pub fn sequential() -> Self {
        Self { pool: None, workers: 1 }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn run(&self, predictor: &FailurePredictor, items: &[BatchItem]) -> BatchReport {
        self.run_with(predictor, items, &BatchHooks::default())
    }

    /// Output order always matches input order, whatever order items finish in
    pub fn run_with(&self, predictor: &FailurePredictor, items: &[BatchItem], hooks: &BatchHooks) -> BatchReport {
        let started_at = Utc::now();
        let completed = AtomicUsize::new(0);
        let total = items.len();

        log::info!("Batch started: {} items on {} worker(s)", total, self.workers);

        let process = |item: &BatchItem| -> BatchResult {
            if hooks.is_cancelled() {
                return BatchResult::cancelled(item.id.clone());
            }

            let result = score_item(predictor, item);

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(progress) = &hooks.progress {
                progress(BatchProgress { completed: done, total });
            }

            result
        };

        let results: Vec<BatchResult> = match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().map(process).collect()),
            None => items.iter().map(process).collect(),
        };

        let report = BatchReport::from_results(started_at, results);
        predictor.stats().record_batch(report.degraded as u64);

        log::info!(
            "Batch {} finished: {} items, {} failing, {} degraded, {} cancelled",
            report.batch_id,
            report.total,
            report.failed,
            report.degraded,
            report.cancelled
        );

        report
    }
}

/// One item, isolated from inference errors and panicking stages
fn score_item(predictor: &FailurePredictor, item: &BatchItem) -> BatchResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| predictor.predict(&item.features)));

    match outcome {
        Ok(Ok(verdict)) => BatchResult::scored(item.id.clone(), verdict),
        Ok(Err(e)) => {
            log::warn!("Batch item '{}' degraded: {}", item.id, e);
            BatchResult::degraded(item.id.clone(), e.to_string())
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            log::warn!("Batch item '{}' degraded after panic: {}", item.id, reason);
            BatchResult::degraded(item.id.clone(), reason)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("stage panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("stage panicked: {}", s)
    } else {
        "stage panicked".to_string()
    }
}
