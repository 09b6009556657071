//! Error types for the timeline engine.
//!
//! The playback hot path (easing, interpolation, path sampling, `tick`)
//! never surfaces errors: it degrades to a plausible default because a
//! thrown fault mid-animation is worse than a momentarily wrong value.
//! `TimelineError` covers the structural operations around it.

use serde::{Deserialize, Serialize};

/// Error type for structural timeline operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimelineError {
    /// Track not found
    #[error("Track not found: {id}")]
    TrackNotFound { id: String },

    /// Invalid timeline definition
    #[error("Invalid definition: {reason}")]
    InvalidDefinition { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic timeline error
    #[error("Timeline error: {message}")]
    Generic { message: String },
}

impl TimelineError {
    /// Create a new generic error
    pub fn new(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging/metrics
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::TrackNotFound { .. } => "data",
            Self::InvalidDefinition { .. } => "validation",
            Self::SerializationError { .. } => "serialization",
            Self::Generic { .. } => "generic",
        }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

impl From<bincode::Error> for TimelineError {
    fn from(err: bincode::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = TimelineError::new("test error");
        assert!(matches!(error, TimelineError::Generic { .. }));
        assert_eq!(error.category(), "generic");
    }

    #[test]
    fn test_serialization() {
        let error = TimelineError::TrackNotFound { id: "t1".into() };
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: TimelineError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }
}
