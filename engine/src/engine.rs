//! Refresh coordination and the cached quote batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use quoteboard_common::{time, AggregateStats, QuoteBatch, SlippageRecord, Timestamp};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::aggregator::{compute_average, compute_slippage, QuoteAggregator};
use crate::sink::QuoteSink;
use crate::source::QuoteSource;

/// Configuration for the quote engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum age of the cached batch before reads trigger a refresh.
    pub freshness_window: chrono::Duration,
    /// Per-source fetch timeout.
    pub source_timeout: std::time::Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            freshness_window: time::constants::freshness_window(),
            source_timeout: time::constants::source_timeout(),
        }
    }
}

/// Snapshot of the engine's refresh state.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub last_success_at: Option<Timestamp>,
    pub is_fresh: bool,
    pub batch_size: usize,
    pub in_progress: bool,
}

/// The quote engine: owns the cached batch and coordinates refreshes.
///
/// Exactly one batch is current at any instant; replacement is atomic with
/// respect to readers, and at most one refresh runs at a time.
pub struct QuoteEngine {
    aggregator: QuoteAggregator,
    batch: RwLock<Arc<QuoteBatch>>,
    in_progress: AtomicBool,
    last_success_at: RwLock<Option<Timestamp>>,
    config: EngineConfig,
}

impl QuoteEngine {
    /// Create a new engine over the given sources and optional sink.
    pub fn new(
        sources: Vec<Arc<dyn QuoteSource>>,
        sink: Option<Arc<dyn QuoteSink>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            aggregator: QuoteAggregator::new(sources, sink, config.source_timeout),
            batch: RwLock::new(Arc::new(QuoteBatch::new())),
            in_progress: AtomicBool::new(false),
            last_success_at: RwLock::new(None),
            config,
        }
    }

    /// Refresh the cache if it is empty or stale.
    ///
    /// Returns immediately when a refresh is already in flight: callers
    /// never block on another caller's refresh and may read a stale batch
    /// (responsiveness over consistency).
    pub async fn ensure_fresh(&self) {
        if self.in_progress.load(Ordering::Acquire) {
            return;
        }
        if self.current_batch().is_empty() || !self.is_fresh() {
            self.refresh().await;
        }
    }

    /// Run one refresh cycle, single-flight.
    ///
    /// Concurrent calls collapse: only the caller that wins the
    /// compare-exchange runs a collection, all others return immediately.
    /// Never returns an error; all source and persistence failures are
    /// logged and confined to this cycle.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in progress");
            return;
        }

        info!("Refreshing quotes");
        let fresh = self.aggregator.collect_all().await;

        if fresh.is_empty() {
            // Never regress a non-empty cache to empty; empty-on-empty is a
            // no-op and last_success_at stays put so retries continue.
            warn!("All sources failed; keeping previous batch");
        } else {
            let size = fresh.len();
            *self.batch.write() = Arc::new(fresh);
            *self.last_success_at.write() = Some(time::now());
            info!(sources = size, "Quote batch replaced");
        }

        self.in_progress.store(false, Ordering::Release);
    }

    /// The current batch. Readers get the previous batch or the
    /// newly-swapped one, never a torn state.
    pub fn current_batch(&self) -> Arc<QuoteBatch> {
        self.batch.read().clone()
    }

    /// Whether the last successful refresh is within the freshness window.
    /// False when no refresh has ever succeeded.
    pub fn is_fresh(&self) -> bool {
        match *self.last_success_at.read() {
            Some(at) => time::now() - at <= self.config.freshness_window,
            None => false,
        }
    }

    /// Mean prices over the current batch, recomputed on every call.
    pub fn average(&self) -> AggregateStats {
        compute_average(&self.current_batch())
    }

    /// Per-source slippage against the current batch averages.
    pub fn slippage(&self) -> Vec<SlippageRecord> {
        let batch = self.current_batch();
        let stats = compute_average(&batch);
        compute_slippage(&batch, &stats)
    }

    /// Snapshot of the refresh state.
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            last_success_at: *self.last_success_at.read(),
            is_fresh: self.is_fresh(),
            batch_size: self.current_batch().len(),
            in_progress: self.in_progress.load(Ordering::Acquire),
        }
    }
}
