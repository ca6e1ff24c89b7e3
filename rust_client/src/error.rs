//! Error type for conjunction search operations.
//!
//! Validation and parse failures are raised before any network call is made.
//! Transport failures are wrapped unchanged so callers can tell them apart
//! from everything else (see [`SearchError::is_transport`]).

use std::time::Duration;

use crate::models::JobState;
use crate::transport::TransportError;

/// Result type for conjunction search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Error type for conjunction search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A start or end timestamp could not be parsed.
    #[error("Could not parse {field} timestamp '{value}'")]
    TimestampParse { field: &'static str, value: String },

    /// More criteria blocks than the backend accepts.
    #[error("Too many criteria blocks: {count} supplied, at most {max} allowed")]
    BlockCountExceeded { count: usize, max: usize },

    /// Distance pairing needs at least two criteria blocks.
    #[error("At least two criteria blocks are required for distance pairing, got {count}")]
    InsufficientBlocks { count: usize },

    /// A caller-supplied distance map lacks a required pairing.
    #[error("Distance map is missing required pairing '{missing_key}'")]
    DistanceValidation { missing_key: String },

    /// Network failure or unexpected HTTP status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered, but not in a shape we can use.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The backend reports the job ended in an error condition.
    #[error("Search job {job_id} failed: {detail}")]
    JobFailed { job_id: String, detail: String },

    /// The caller-supplied polling deadline elapsed.
    #[error("Search job {job_id} was not ready after {waited:?}")]
    PollTimeout { job_id: String, waited: Duration },

    /// Polling was cancelled through the caller's token.
    #[error("Polling for search job {job_id} was cancelled")]
    Cancelled { job_id: String },

    /// A job operation was invoked out of order.
    #[error("Search job {job_id} is {actual}, expected {expected}")]
    InvalidJobState {
        job_id: String,
        expected: &'static str,
        actual: JobState,
    },

    /// The request could not be encoded as JSON.
    #[error("Failed to serialize search request: {0}")]
    Serialization(String),

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SearchError {
    /// Whether this error came from the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this error was raised before anything was sent to the backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TimestampParse { .. }
                | Self::BlockCountExceeded { .. }
                | Self::InsufficientBlocks { .. }
                | Self::DistanceValidation { .. }
                | Self::Serialization(_)
        )
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimestampParse { .. } => "timestamp_parse",
            Self::BlockCountExceeded { .. } => "block_count_exceeded",
            Self::InsufficientBlocks { .. } => "insufficient_blocks",
            Self::DistanceValidation { .. } => "distance_validation",
            Self::Transport(_) => "transport",
            Self::MalformedResponse(_) => "malformed_response",
            Self::JobFailed { .. } => "job_failed",
            Self::PollTimeout { .. } => "poll_timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::InvalidJobState { .. } => "invalid_job_state",
            Self::Serialization(_) => "serialization",
            Self::Configuration(_) => "configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_count_message_names_count() {
        let err = SearchError::BlockCountExceeded { count: 11, max: 10 };
        let msg = err.to_string();
        assert!(msg.contains("11"));
        assert!(msg.contains("10"));
        assert_eq!(err.kind(), "block_count_exceeded");
    }

    #[test]
    fn test_distance_validation_message_names_key() {
        let err = SearchError::DistanceValidation {
            missing_key: "ground1-space2".to_string(),
        };
        assert!(err.to_string().contains("ground1-space2"));
        assert!(err.is_validation());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_errors_are_flagged() {
        let err: SearchError = TransportError::connection("refused").into();
        assert!(err.is_transport());
        assert!(!err.is_validation());
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_invalid_state_display() {
        let err = SearchError::InvalidJobState {
            job_id: "abc".to_string(),
            expected: "ready",
            actual: JobState::Polling,
        };
        assert_eq!(err.to_string(), "Search job abc is polling, expected ready");
    }
}
