//! Quote source trait and test double.

use async_trait::async_trait;
use quoteboard_common::Quote;

use crate::error::EngineResult;

/// A single external quote source.
///
/// Implementations must be idempotent and side-effect-free beyond the
/// network call. The engine imposes its own timeout on `fetch`, but
/// implementations should also bound their own I/O.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Fetch the current quote from this source.
    async fn fetch(&self) -> EngineResult<Quote>;
}

/// Mock quote source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockQuoteSource {
    name: String,
    prices: Option<(rust_decimal::Decimal, rust_decimal::Decimal)>,
    delay: Option<std::time::Duration>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockQuoteSource {
    /// A source that always returns the given buy/sell prices.
    pub fn new(
        name: impl Into<String>,
        buy_price: rust_decimal::Decimal,
        sell_price: rust_decimal::Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            prices: Some((buy_price, sell_price)),
            delay: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A source that always fails.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prices: None,
            delay: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Delay each fetch by the given duration before responding.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `fetch` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl QuoteSource for MockQuoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> EngineResult<Quote> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.prices {
            Some((buy, sell)) => Ok(Quote::new(self.name.clone(), buy, sell)),
            None => Err(crate::error::EngineError::SourceFailed {
                source: self.name.clone(),
                reason: "mock failure".to_string(),
            }),
        }
    }
}
