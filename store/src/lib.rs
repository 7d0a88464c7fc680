//! QuoteBoard Store
//!
//! SQLite persistence for fetched quotes. The store is a best-effort sink
//! from the engine's perspective: insert failures are reported to the
//! caller, logged there, and never affect the in-memory batch.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{QuoteStore, StoredQuote};
