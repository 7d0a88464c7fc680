//! Concurrent quote collection and derived statistics.

use std::sync::Arc;
use std::time::Duration;

use quoteboard_common::{time, AggregateStats, Quote, QuoteBatch, SlippageRecord};
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::sink::QuoteSink;
use crate::source::QuoteSource;

/// Polls every registered source concurrently, isolating failures, and
/// forwards successful quotes to the sink best-effort.
pub struct QuoteAggregator {
    sources: Vec<Arc<dyn QuoteSource>>,
    sink: Option<Arc<dyn QuoteSink>>,
    source_timeout: Duration,
}

impl QuoteAggregator {
    /// Create a new aggregator over the given sources.
    pub fn new(
        sources: Vec<Arc<dyn QuoteSource>>,
        sink: Option<Arc<dyn QuoteSink>>,
        source_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            sink,
            source_timeout,
        }
    }

    /// Fetch from all sources concurrently and wait for every one to settle.
    ///
    /// Failed, timed-out, or panicked source tasks are logged and omitted;
    /// the batch holds successful quotes in completion order. Zero successes
    /// yields an empty batch, which is a valid result, not an error.
    pub async fn collect_all(&self) -> QuoteBatch {
        let mut tasks = JoinSet::new();

        for source in &self.sources {
            let source = Arc::clone(source);
            let deadline = self.source_timeout;

            tasks.spawn(async move {
                let name = source.name().to_string();
                match tokio::time::timeout(deadline, source.fetch()).await {
                    Ok(Ok(quote)) => Ok(quote),
                    Ok(Err(error)) => Err(error),
                    Err(_) => Err(EngineError::SourceTimedOut(name, deadline)),
                }
            });
        }

        let mut batch = QuoteBatch::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(quote)) => {
                    debug!(
                        source = %quote.source,
                        buy = %quote.buy_price,
                        sell = %quote.sell_price,
                        "Source responded"
                    );
                    if quote.has_inverted_spread() {
                        warn!(source = %quote.source, "Quote has sell price below buy price");
                    }
                    batch.push(quote);
                }
                Ok(Err(error)) => {
                    warn!(error = %error, "Source dropped from batch");
                }
                Err(join_error) => {
                    warn!(error = %join_error, "Source task panicked");
                }
            }
        }

        debug!(
            succeeded = batch.len(),
            polled = self.sources.len(),
            "Quote collection settled"
        );

        self.persist(&batch).await;
        batch
    }

    /// Forward each quote to the sink as an independent task and wait for
    /// all of them. A failure for one quote does not affect the others.
    async fn persist(&self, batch: &QuoteBatch) {
        let Some(sink) = &self.sink else {
            return;
        };

        let mut tasks = JoinSet::new();
        for quote in batch {
            let sink = Arc::clone(sink);
            let quote = quote.clone();
            tasks.spawn(async move {
                let source = quote.source.clone();
                sink.store(&quote).await.map_err(|error| (source, error))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err((source, error))) => {
                    warn!(source = %source, error = %error, "Failed to persist quote");
                }
                Err(join_error) => {
                    warn!(error = %join_error, "Persistence task panicked");
                }
            }
        }
    }
}

/// Arithmetic mean of buy and sell prices across the batch, rounded to
/// 4 decimal places. An empty batch yields zero averages with
/// `sources_count == 0`.
pub fn compute_average(batch: &[Quote]) -> AggregateStats {
    if batch.is_empty() {
        return AggregateStats::empty();
    }

    let count = Decimal::from(batch.len());
    let total_buy: Decimal = batch.iter().map(|quote| quote.buy_price).sum();
    let total_sell: Decimal = batch.iter().map(|quote| quote.sell_price).sum();

    AggregateStats {
        average_buy_price: round4(total_buy / count),
        average_sell_price: round4(total_sell / count),
        sources_count: batch.len(),
        computed_at: time::now(),
    }
}

/// Per-quote percentage deviation from the batch averages, rounded to
/// 4 decimal places. Returns an empty vector when the averages are zero
/// (empty batch) rather than dividing by zero.
pub fn compute_slippage(batch: &[Quote], stats: &AggregateStats) -> Vec<SlippageRecord> {
    if stats.average_buy_price.is_zero() || stats.average_sell_price.is_zero() {
        return Vec::new();
    }

    batch
        .iter()
        .map(|quote| SlippageRecord {
            source: quote.source.clone(),
            buy_price_slippage_pct: round4(
                (quote.buy_price - stats.average_buy_price) / stats.average_buy_price
                    * Decimal::ONE_HUNDRED,
            ),
            sell_price_slippage_pct: round4(
                (quote.sell_price - stats.average_sell_price) / stats.average_sell_price
                    * Decimal::ONE_HUNDRED,
            ),
            original_buy_price: quote.buy_price,
            original_sell_price: quote.sell_price,
        })
        .collect()
}

/// All published statistics round to 4 decimal places, half away from zero.
fn round4(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::source::MockQuoteSource;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn sources(list: Vec<MockQuoteSource>) -> Vec<Arc<dyn QuoteSource>> {
        list.into_iter()
            .map(|source| Arc::new(source) as Arc<dyn QuoteSource>)
            .collect()
    }

    #[test]
    fn test_round4_half_away_from_zero() {
        assert_eq!(round4(dec!(1.00005)), dec!(1.0001));
        assert_eq!(round4(dec!(-1.00005)), dec!(-1.0001));
        assert_eq!(round4(dec!(1.00004)), dec!(1.0000));
    }

    #[test]
    fn test_compute_average_empty_batch() {
        let stats = compute_average(&[]);

        assert_eq!(stats.average_buy_price, Decimal::ZERO);
        assert_eq!(stats.average_sell_price, Decimal::ZERO);
        assert!(!stats.has_data());
    }

    #[test]
    fn test_compute_slippage_empty_batch() {
        let stats = compute_average(&[]);
        let records = compute_slippage(&[], &stats);

        assert!(records.is_empty());
    }

    #[test]
    fn test_compute_slippage_known_batch() {
        let batch = vec![
            Quote::new("https://a.example", dec!(100), dec!(110)),
            Quote::new("https://b.example", dec!(102), dec!(112)),
        ];
        let stats = compute_average(&batch);
        let records = compute_slippage(&batch, &stats);

        assert_eq!(stats.average_buy_price, dec!(101.0000));
        assert_eq!(stats.average_sell_price, dec!(111.0000));
        assert_eq!(records.len(), 2);

        // 100 vs mean 101 -> -0.9901%, 102 vs mean 101 -> +0.9901%
        assert_eq!(records[0].buy_price_slippage_pct, dec!(-0.9901));
        assert_eq!(records[1].buy_price_slippage_pct, dec!(0.9901));
        assert_eq!(records[0].original_buy_price, dec!(100));
        assert_eq!(records[1].original_sell_price, dec!(112));
    }

    #[tokio::test]
    async fn test_collect_all_tolerates_failed_source() {
        let aggregator = QuoteAggregator::new(
            sources(vec![
                MockQuoteSource::new("https://a.example", dec!(100), dec!(110)),
                MockQuoteSource::failing("https://broken.example"),
                MockQuoteSource::new("https://b.example", dec!(102), dec!(112)),
            ]),
            None,
            Duration::from_secs(5),
        );

        let batch = aggregator.collect_all().await;

        assert_eq!(batch.len(), 2);
        let stats = compute_average(&batch);
        assert_eq!(stats.average_buy_price, dec!(101.0));
        assert_eq!(stats.average_sell_price, dec!(111.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_all_times_out_slow_source() {
        let aggregator = QuoteAggregator::new(
            sources(vec![
                MockQuoteSource::new("https://a.example", dec!(100), dec!(110)),
                MockQuoteSource::new("https://slow.example", dec!(999), dec!(999))
                    .with_delay(Duration::from_secs(30)),
                MockQuoteSource::new("https://b.example", dec!(102), dec!(112)),
            ]),
            None,
            Duration::from_secs(5),
        );

        let batch = aggregator.collect_all().await;

        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|q| q.source != "https://slow.example"));
        let stats = compute_average(&batch);
        assert_eq!(stats.average_buy_price, dec!(101.0));
        assert_eq!(stats.average_sell_price, dec!(111.0));
    }

    #[tokio::test]
    async fn test_collect_all_with_all_sources_failing() {
        let aggregator = QuoteAggregator::new(
            sources(vec![
                MockQuoteSource::failing("https://a.example"),
                MockQuoteSource::failing("https://b.example"),
            ]),
            None,
            Duration::from_secs(5),
        );

        let batch = aggregator.collect_all().await;

        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_successful_quotes_are_persisted() {
        let sink = Arc::new(MemorySink::new());
        let aggregator = QuoteAggregator::new(
            sources(vec![
                MockQuoteSource::new("https://a.example", dec!(100), dec!(110)),
                MockQuoteSource::failing("https://broken.example"),
            ]),
            Some(sink.clone()),
            Duration::from_secs(5),
        );

        let batch = aggregator.collect_all().await;

        assert_eq!(batch.len(), 1);
        let stored = sink.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].source, "https://a.example");
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_affect_batch() {
        let sink = Arc::new(MemorySink::failing());
        let aggregator = QuoteAggregator::new(
            sources(vec![
                MockQuoteSource::new("https://a.example", dec!(100), dec!(110)),
                MockQuoteSource::new("https://b.example", dec!(102), dec!(112)),
            ]),
            Some(sink),
            Duration::from_secs(5),
        );

        let batch = aggregator.collect_all().await;

        assert_eq!(batch.len(), 2);
    }

    proptest! {
        /// Prices reconstructed from slippage records match the originals
        /// within rounding tolerance.
        #[test]
        fn slippage_reconstructs_original_prices(
            cents in proptest::collection::vec((100i64..10_000_000, 100i64..10_000_000), 1..8)
        ) {
            let batch: Vec<Quote> = cents
                .iter()
                .enumerate()
                .map(|(i, (buy, sell))| {
                    Quote::new(
                        format!("https://source-{i}.example"),
                        Decimal::new(*buy, 2),
                        Decimal::new(*sell, 2),
                    )
                })
                .collect();

            let stats = compute_average(&batch);
            let records = compute_slippage(&batch, &stats);
            prop_assert_eq!(records.len(), batch.len());

            for (quote, record) in batch.iter().zip(&records) {
                let buy = stats.average_buy_price
                    * (Decimal::ONE + record.buy_price_slippage_pct / Decimal::ONE_HUNDRED);
                let sell = stats.average_sell_price
                    * (Decimal::ONE + record.sell_price_slippage_pct / Decimal::ONE_HUNDRED);

                // Slippage is rounded to 4 decimals, so reconstruction is
                // exact to ~5e-7 of the mean.
                let buy_tolerance = stats.average_buy_price * Decimal::new(1, 6);
                let sell_tolerance = stats.average_sell_price * Decimal::new(1, 6);
                prop_assert!((buy - quote.buy_price).abs() <= buy_tolerance);
                prop_assert!((sell - quote.sell_price).abs() <= sell_tolerance);
            }
        }
    }
}
