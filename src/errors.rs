//! Error types for temporal state operations

use thiserror::Error;

/// Errors that can occur while deriving or evaluating temporal state
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemporalError {
    /// Malformed timestamp, duration, or import identifier text
    #[error("format error: {0}")]
    Format(String),

    /// No offset unit or absolute target populated where one is required
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A lifecycle delay was interrupted by an external cancellation signal
    #[error("delay cancelled after {waited_ms}ms")]
    Cancelled {
        /// Milliseconds actually waited before the signal fired
        waited_ms: u64,
    },
}

/// Result type for temporal state operations
pub type TemporalResult<T> = Result<T, TemporalError>;

impl TemporalError {
    /// Build a format error from anything displayable
    pub fn format(msg: impl std::fmt::Display) -> Self {
        TemporalError::Format(msg.to_string())
    }

    /// Build a configuration error from anything displayable
    pub fn configuration(msg: impl std::fmt::Display) -> Self {
        TemporalError::Configuration(msg.to_string())
    }
}

impl From<chrono::ParseError> for TemporalError {
    fn from(err: chrono::ParseError) -> Self {
        TemporalError::Format(err.to_string())
    }
}

impl From<crate::state_machine::TransitionError> for TemporalError {
    fn from(err: crate::state_machine::TransitionError) -> Self {
        TemporalError::Configuration(err.to_string())
    }
}
