//! Time utilities and timing constants for QuoteBoard.

use chrono::{DateTime, Utc};

/// Service timing constants.
pub mod constants {
    use chrono::Duration;

    /// Maximum age of the cached batch before reads trigger a refresh (60 seconds).
    pub fn freshness_window() -> Duration {
        Duration::seconds(60)
    }

    /// Per-source fetch timeout (5 seconds).
    pub fn source_timeout() -> std::time::Duration {
        std::time::Duration::from_secs(5)
    }

    /// Interval between scheduled background refreshes (60 seconds).
    pub fn refresh_interval() -> std::time::Duration {
        std::time::Duration::from_secs(60)
    }

    /// Lookback window for the recent-quotes persistence query (5 minutes).
    pub fn recent_window() -> Duration {
        Duration::minutes(5)
    }
}

/// A timestamp with timezone (always UTC for QuoteBoard).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Check if a timestamp is within the given window of the current time.
pub fn is_within(timestamp: Timestamp, window: chrono::Duration) -> bool {
    now() - timestamp <= window
}
