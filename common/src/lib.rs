//! QuoteBoard Common Types
//!
//! Shared types used across the QuoteBoard service: quotes, derived
//! statistics, and time helpers.

pub mod quote;
pub mod time;

pub use quote::*;
pub use time::*;
