//! HTTP routes over the quote engine.
//!
//! Every endpoint is a synchronous read of in-memory state, preceded by
//! `ensure_fresh()` so the first read after staleness refreshes the cache
//! (and concurrent reads collapse into the in-flight refresh).

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use quoteboard_common::{AggregateStats, Quote, SlippageRecord};
use quoteboard_engine::{EngineStatus, QuoteEngine};
use serde::Serialize;
use tower_http::cors::CorsLayer;

/// Build the API router.
pub fn create_router(engine: Arc<QuoteEngine>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/quotes", get(get_quotes))
        .route("/average", get(get_average))
        .route("/slippage", get(get_slippage))
        .route("/status", get(get_status))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Currency quote API",
        "endpoints": {
            "quotes": "/quotes",
            "average": "/average",
            "slippage": "/slippage",
            "status": "/status",
        }
    }))
}

async fn get_quotes(State(engine): State<Arc<QuoteEngine>>) -> Json<Vec<Quote>> {
    engine.ensure_fresh().await;
    Json(engine.current_batch().as_ref().clone())
}

#[derive(Serialize)]
struct AverageResponse {
    #[serde(flatten)]
    stats: AggregateStats,
    /// Set when the batch is empty; empty is a valid state, not an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

async fn get_average(State(engine): State<Arc<QuoteEngine>>) -> Json<AverageResponse> {
    engine.ensure_fresh().await;
    let stats = engine.average();
    let message = (!stats.has_data()).then_some("No data available");
    Json(AverageResponse { stats, message })
}

async fn get_slippage(State(engine): State<Arc<QuoteEngine>>) -> Json<Vec<SlippageRecord>> {
    engine.ensure_fresh().await;
    Json(engine.slippage())
}

async fn get_status(State(engine): State<Arc<QuoteEngine>>) -> Json<EngineStatus> {
    engine.ensure_fresh().await;
    Json(engine.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use quoteboard_engine::{EngineConfig, MockQuoteSource, QuoteSource};
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    fn app(sources: Vec<Arc<dyn QuoteSource>>) -> Router {
        let engine = Arc::new(QuoteEngine::new(sources, None, EngineConfig::default()));
        create_router(engine)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn two_sources() -> Vec<Arc<dyn QuoteSource>> {
        vec![
            Arc::new(MockQuoteSource::new("https://a.example", dec!(100), dec!(110))),
            Arc::new(MockQuoteSource::new("https://b.example", dec!(102), dec!(112))),
        ]
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let (status, body) = get_json(app(two_sources()), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["average"], "/average");
    }

    #[tokio::test]
    async fn test_quotes_returns_current_batch() {
        let (status, body) = get_json(app(two_sources()), "/quotes").await;

        assert_eq!(status, StatusCode::OK);
        let quotes = body.as_array().unwrap();
        assert_eq!(quotes.len(), 2);
        assert!(quotes.iter().all(|q| q["buy_price"].is_f64()));
    }

    #[tokio::test]
    async fn test_average_with_data() {
        let (status, body) = get_json(app(two_sources()), "/average").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["average_buy_price"], 101.0);
        assert_eq!(body["average_sell_price"], 111.0);
        assert_eq!(body["sources_count"], 2);
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_average_without_data_is_marker_not_error() {
        let sources: Vec<Arc<dyn QuoteSource>> =
            vec![Arc::new(MockQuoteSource::failing("https://a.example"))];
        let (status, body) = get_json(app(sources), "/average").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["average_buy_price"], 0.0);
        assert_eq!(body["average_sell_price"], 0.0);
        assert_eq!(body["message"], "No data available");
    }

    #[tokio::test]
    async fn test_slippage_empty_when_no_data() {
        let sources: Vec<Arc<dyn QuoteSource>> =
            vec![Arc::new(MockQuoteSource::failing("https://a.example"))];
        let (status, body) = get_json(app(sources), "/slippage").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_status_shape() {
        let (status, body) = get_json(app(two_sources()), "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["batch_size"], 2);
        assert_eq!(body["is_fresh"], true);
        assert_eq!(body["in_progress"], false);
        assert!(body["last_success_at"].is_string());
    }
}
