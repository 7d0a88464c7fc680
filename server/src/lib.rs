//! QuoteBoard Server
//!
//! HTTP layer over the quote engine: a small JSON read API plus the
//! background refresh scheduler. All endpoints are reads of in-memory
//! state; each triggers a refresh first when the cache is empty or stale.

pub mod config;
pub mod routes;

pub use config::ServerConfig;
pub use routes::create_router;
