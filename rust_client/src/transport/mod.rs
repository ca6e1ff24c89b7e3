//! Transport layer between the search workflow and the backend API.
//!
//! The workflow only talks to the backend through [`SearchTransport`], so the
//! HTTP implementation can be swapped for the in-memory one in tests.
//!
//! - [`HttpTransport`]: reqwest-based client for the real API
//! - [`LocalTransport`]: scripted in-memory backend for tests and local development

pub mod error;
pub mod http;
pub mod local;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{JobStatusReport, JobType, RawPayload};

pub use error::{ErrorContext, TransportError, TransportResult};
pub use http::HttpTransport;
pub use local::LocalTransport;

/// Status, headers and body of a submission response.
///
/// Header names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Backend operations needed to run an asynchronous search job.
///
/// Implementations must be `Send + Sync`; one transport may serve several
/// independent searches at once.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Send a serialized search request. The status code is returned as-is;
    /// deciding what counts as success is up to the caller.
    async fn submit(&self, job_type: JobType, payload: &str) -> TransportResult<TransportResponse>;

    /// Query the status of a submitted job.
    async fn job_status(&self, job_type: JobType, job_id: &str) -> TransportResult<JobStatusReport>;

    /// Download the result payload of a completed job.
    async fn download_result(&self, job_type: JobType, job_id: &str) -> TransportResult<RawPayload>;

    /// Ask the backend to discard a job.
    async fn cancel_job(&self, job_type: JobType, job_id: &str) -> TransportResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = TransportResponse::new(202, "").with_header("Location", "/requests/abc");
        assert_eq!(response.header("location"), Some("/requests/abc"));
        assert_eq!(response.header("LOCATION"), Some("/requests/abc"));
        assert_eq!(response.header("x-missing"), None);
    }
}
