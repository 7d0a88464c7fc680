//! Ambito adapter: official dollar quote from the Ambito market API.

use async_trait::async_trait;
use quoteboard_common::Quote;
use quoteboard_engine::{EngineError, EngineResult, QuoteSource};
use serde::Deserialize;
use tracing::debug;

use crate::parse::parse_price;

/// Stable source identifier recorded on every quote.
const SOURCE_URL: &str = "https://www.ambito.com/contenidos/dolar.html";

/// JSON endpoint backing the page; far more stable than the page markup.
const API_URL: &str = "https://mercados.ambito.com/dolar/oficial/variacion";

#[derive(Debug, Deserialize)]
struct AmbitoVariacion {
    compra: String,
    venta: String,
}

/// Quote source for ambito.com.
pub struct AmbitoSource {
    client: reqwest::Client,
}

impl AmbitoSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn failure(&self, reason: impl std::fmt::Display) -> EngineError {
        EngineError::SourceFailed {
            source: SOURCE_URL.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for AmbitoSource {
    fn name(&self) -> &str {
        SOURCE_URL
    }

    async fn fetch(&self) -> EngineResult<Quote> {
        debug!(url = API_URL, "Fetching Ambito quote");

        let response = self
            .client
            .get(API_URL)
            .send()
            .await
            .map_err(|e| self.failure(e))?
            .error_for_status()
            .map_err(|e| self.failure(e))?;

        let data: AmbitoVariacion = response.json().await.map_err(|e| self.failure(e))?;

        let buy_price = parse_price(&data.compra)
            .ok_or_else(|| self.failure(format!("unparseable buy price: {:?}", data.compra)))?;
        let sell_price = parse_price(&data.venta)
            .ok_or_else(|| self.failure(format!("unparseable sell price: {:?}", data.venta)))?;

        Ok(Quote::new(SOURCE_URL, buy_price, sell_price))
    }
}
