//! QuoteBoard Source Adapters
//!
//! `QuoteSource` implementations for the public currency quote sites the
//! service polls. Each adapter is independent: a failure in one never
//! affects the others, and the engine treats every returned quote
//! identically regardless of how the adapter obtained it.
//!
//! Adapters never fabricate quotes on transport failure; errors surface as
//! `EngineError::SourceFailed` and the engine drops that source from the
//! batch for the cycle.

pub mod ambito;
pub mod cronista;
pub mod dolarhoy;
pub mod parse;

use std::sync::Arc;
use std::time::Duration;

use quoteboard_engine::QuoteSource;

pub use ambito::AmbitoSource;
pub use cronista::CronistaSource;
pub use dolarhoy::DolarHoySource;

/// Browser User-Agent sent with every request; several of the sites reject
/// the default client identity.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build the shared HTTP client used by all adapters.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// The default adapter set, one per supported site, sharing one client.
pub fn default_sources(timeout: Duration) -> Result<Vec<Arc<dyn QuoteSource>>, reqwest::Error> {
    let client = build_client(timeout)?;
    Ok(vec![
        Arc::new(AmbitoSource::new(client.clone())),
        Arc::new(DolarHoySource::new(client.clone())),
        Arc::new(CronistaSource::new(client)),
    ])
}
