//! Persistence sink trait and test double.

use async_trait::async_trait;
use quoteboard_common::Quote;

use crate::error::EngineResult;

/// Durable destination for successful quotes.
///
/// Fire-and-forget from the aggregator's perspective: failures are logged,
/// never retried, and never block a refresh.
#[async_trait]
pub trait QuoteSink: Send + Sync {
    /// Durably record one quote.
    async fn store(&self, quote: &Quote) -> EngineResult<()>;
}

/// In-memory sink for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MemorySink {
    stored: parking_lot::Mutex<Vec<Quote>>,
    fail: bool,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemorySink {
    /// A sink that records every stored quote.
    pub fn new() -> Self {
        Self {
            stored: parking_lot::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A sink that rejects every store attempt.
    pub fn failing() -> Self {
        Self {
            stored: parking_lot::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// All quotes stored so far.
    pub fn stored(&self) -> Vec<Quote> {
        self.stored.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl QuoteSink for MemorySink {
    async fn store(&self, quote: &Quote) -> EngineResult<()> {
        if self.fail {
            return Err(crate::error::EngineError::PersistenceFailed {
                source: quote.source.clone(),
                reason: "mock sink failure".to_string(),
            });
        }
        self.stored.lock().push(quote.clone());
        Ok(())
    }
}
