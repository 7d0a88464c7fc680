//! QuoteBoard Engine
//!
//! Quote cache and aggregation engine: collects buy/sell quotes from
//! multiple unreliable sources, tolerates partial failure, caches the latest
//! batch, and computes derived statistics.
//!
//! # Features
//!
//! - Concurrent fan-out to all registered sources with per-source timeouts
//! - Single-flight refresh coordination with a freshness window
//! - Atomic batch replacement (readers never observe a torn batch)
//! - Best-effort persistence of each successful quote
//!
//! # Example
//!
//! ```rust,ignore
//! use quoteboard_engine::{EngineConfig, QuoteEngine};
//!
//! let engine = QuoteEngine::new(sources, Some(sink), EngineConfig::default());
//!
//! // Reads refresh the cache first when it is empty or stale.
//! engine.ensure_fresh().await;
//! let stats = engine.average();
//! let slippage = engine.slippage();
//! ```

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod sink;
pub mod source;

pub use aggregator::{compute_average, compute_slippage, QuoteAggregator};
pub use engine::{EngineConfig, EngineStatus, QuoteEngine};
pub use error::{EngineError, EngineResult};
pub use sink::QuoteSink;
pub use source::QuoteSource;

#[cfg(any(test, feature = "test-utils"))]
pub use sink::MemorySink;
#[cfg(any(test, feature = "test-utils"))]
pub use source::MockQuoteSource;
