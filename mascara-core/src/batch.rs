//! Chunked, order-preserving batch orchestration.
//!
//! Input is split into fixed-size chunks processed one after another; records
//! inside a chunk run on a bounded rayon pool and write into index-addressed
//! slots, so output order never depends on scheduling. Between chunks the
//! runner checks for cancellation and emits a non-blocking progress report.
//!
//! License: MIT OR Apache-2.0

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::BatchConfig;
use crate::engine::DetectionEngine;
use crate::entity::{DetectionResult, PiiType, TypeCount};
use crate::errors::MascaraError;
use crate::masking::MaskingOptions;

pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub chunk_size: usize,
    /// Worker threads for in-chunk parallelism; 0 means one per CPU.
    pub workers: usize,
    /// When false, chunks are processed on the calling thread.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: 0,
            parallel: true,
        }
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            workers: config.workers,
            parallel: true,
        }
    }
}

/// Sent after every completed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
}

/// Cooperative cancellation, observed between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
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

/// Replaces missing records with empty text.
pub fn normalize_records<I, S>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    records.into_iter().map(|r| r.map(Into::into).unwrap_or_default()).collect()
}

pub struct BatchRunner {
    options: BatchOptions,
    pool: Option<rayon::ThreadPool>,
    progress_tx: Option<mpsc::Sender<BatchProgress>>,
    cancel: Option<CancellationFlag>,
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("options", &self.options)
            .field("threads", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .field("reports_progress", &self.progress_tx.is_some())
            .finish()
    }
}

impl BatchRunner {
    /// Fails with `InvalidChunkSize` before any record is touched.
    pub fn new(options: BatchOptions) -> Result<Self, MascaraError> {
        if options.chunk_size == 0 {
            return Err(MascaraError::InvalidChunkSize(options.chunk_size));
        }
        let pool = if options.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.workers)
                .thread_name(|i| format!("mascara-worker-{}", i))
                .build()
                .map_err(|e| MascaraError::AnyhowWrapper(anyhow!("Failed to build worker pool: {}", e)))?;
            debug!("Batch worker pool ready with {} threads.", pool.current_num_threads());
            Some(pool)
        } else {
            None
        };
        Ok(Self {
            options,
            pool,
            progress_tx: None,
            cancel: None,
        })
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<BatchProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    fn report(&self, progress: BatchProgress) {
        if let Some(tx) = &self.progress_tx {
            // A slow or absent listener must never hold up the next chunk.
            if let Err(e) = tx.try_send(progress) {
                debug!("Progress report {}/{} dropped: {}", progress.processed, progress.total, e);
            }
        }
    }

    /// Applies `f` to every record, chunk by chunk, returning outputs aligned
    /// with `records`.
    pub fn run<S, T, F>(&self, records: &[S], f: F) -> Result<Vec<T>, MascaraError>
    where
        S: AsRef<str> + Sync,
        T: Send,
        F: Fn(&str) -> T + Sync,
    {
        let total = records.len();
        let chunk_size = self.options.chunk_size;
        let mut slots: Vec<Option<T>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        let mut processed = 0;

        for (chunk, out) in records.chunks(chunk_size).zip(slots.chunks_mut(chunk_size)) {
            if self.cancel.as_ref().map_or(false, CancellationFlag::is_cancelled) {
                warn!("Batch cancelled after {} of {} records.", processed, total);
                return Err(MascaraError::Cancelled { processed, total });
            }

            match &self.pool {
                Some(pool) => pool.install(|| {
                    out.par_iter_mut()
                        .zip(chunk.par_iter())
                        .for_each(|(slot, record)| *slot = Some(f(record.as_ref())));
                }),
                None => {
                    for (slot, record) in out.iter_mut().zip(chunk) {
                        *slot = Some(f(record.as_ref()));
                    }
                }
            }

            processed += chunk.len();
            debug!("Chunk done: {}/{} records.", processed, total);
            self.report(BatchProgress { processed, total });
        }

        Ok(slots.into_iter().flatten().collect())
    }

    pub fn detect_batch<S>(&self, engine: &dyn DetectionEngine, records: &[S]) -> Result<Vec<DetectionResult>, MascaraError>
    where
        S: AsRef<str> + Sync,
    {
        info!("Analyzing {} records in chunks of {}.", records.len(), self.options.chunk_size);
        self.run(records, |text| engine.detect(text))
    }

    pub fn mask_batch<S>(
        &self,
        engine: &dyn DetectionEngine,
        records: &[S],
        options: &MaskingOptions,
    ) -> Result<Vec<String>, MascaraError>
    where
        S: AsRef<str> + Sync,
    {
        info!(
            "Masking {} records with policy {} in chunks of {}.",
            records.len(),
            options.policy,
            self.options.chunk_size
        );
        self.run(records, |text| engine.mask_text(text, options))
    }
}

/// Aggregate view over a batch of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_records: usize,
    pub records_with_pii: usize,
    pub mean_risk_score: f64,
    /// Per-type totals, in `PiiType::ALL` order.
    pub totals: Vec<TypeCount>,
    pub records_with_warnings: usize,
    pub analyzed_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn from_results(results: &[DetectionResult]) -> Self {
        let mut totals: BTreeMap<PiiType, TypeCount> = PiiType::ALL
            .iter()
            .map(|&pii_type| (pii_type, TypeCount { pii_type, verified: 0, suspect: 0, total: 0 }))
            .collect();

        for result in results {
            for count in result.counts() {
                if let Some(t) = totals.get_mut(&count.pii_type) {
                    t.verified += count.verified;
                    t.suspect += count.suspect;
                    t.total += count.total;
                }
            }
        }

        let mean_risk_score = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.risk_score).sum::<f64>() / results.len() as f64
        };

        Self {
            total_records: results.len(),
            records_with_pii: results.iter().filter(|r| r.has_pii).count(),
            mean_risk_score,
            totals: totals.into_values().collect(),
            records_with_warnings: results.iter().filter(|r| !r.warnings.is_empty()).count(),
            analyzed_at: Utc::now(),
        }
    }
}
