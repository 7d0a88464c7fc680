//! Engine error types.
//!
//! Every variant is terminal-but-local to a single source or persistence
//! attempt: the refresh coordinator logs and swallows them, so nothing here
//! propagates to API callers.

use std::fmt;

/// Errors that can occur while collecting or persisting quotes.
///
/// `Display` and `Error` are implemented by hand because `thiserror` treats
/// any field named `source` as the error's cause, and these `source` fields
/// are plain source-identifier strings mandated by the spec.
#[derive(Debug)]
pub enum EngineError {
    /// A single source's fetch failed.
    SourceFailed { source: String, reason: String },

    /// A single source exceeded the per-source timeout.
    SourceTimedOut(String, std::time::Duration),

    /// A successful quote could not be durably stored.
    PersistenceFailed { source: String, reason: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceFailed { source, reason } => {
                write!(f, "Source {source} failed: {reason}")
            }
            Self::SourceTimedOut(source, timeout) => {
                write!(f, "Source {source} timed out after {timeout:?}")
            }
            Self::PersistenceFailed { source, reason } => {
                write!(f, "Persistence failed for {source}: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
