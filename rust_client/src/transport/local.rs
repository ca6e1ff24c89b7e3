//! In-memory local transport implementation.
//!
//! This module provides a scripted stand-in for the backend, suitable for unit
//! testing and local development. Responses are configured up front and every
//! call is recorded, so tests can assert on exactly what the workflow sent.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{SearchTransport, TransportError, TransportResponse, TransportResult};
use crate::models::{JobStatusReport, JobType, RawPayload};

/// In-memory scripted backend.
///
/// By default a submission is accepted (`202`) with a freshly generated job
/// id in the `Location` header, the job is reported complete on the first
/// status query, and the result is an empty JSON array.
///
/// # Example
/// ```
/// use aurorax_rust::models::JobStatusReport;
/// use aurorax_rust::transport::LocalTransport;
///
/// let transport = LocalTransport::new()
///     .with_job_id("abc123")
///     .with_status_sequence(vec![JobStatusReport::pending(), JobStatusReport::ready(1024)])
///     .with_result(r#"[{"start": "2020-01-01T00:00:00", "end": "2020-01-01T00:05:00"}]"#);
/// assert_eq!(transport.status_query_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalTransport {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    job_id: String,
    submit_status: u16,
    submit_body: String,
    location: Option<String>,
    status_script: VecDeque<JobStatusReport>,
    last_status: JobStatusReport,
    result_body: String,

    // Recorded calls
    submitted_payloads: Vec<String>,
    status_queries: Vec<String>,
    downloads: Vec<String>,
    cancellations: Vec<String>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        let result_body = "[]".to_string();
        Self {
            job_id: Uuid::new_v4().to_string(),
            submit_status: 202,
            submit_body: String::new(),
            location: None,
            status_script: VecDeque::new(),
            last_status: JobStatusReport::ready(result_body.len() as u64),
            result_body,
            submitted_payloads: Vec::new(),
            status_queries: Vec::new(),
            downloads: Vec::new(),
            cancellations: Vec::new(),
            is_healthy: true,
        }
    }
}

impl LocalTransport {
    /// Create a transport with the default accepting script.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Job id handed out on submission.
    pub fn with_job_id(self, job_id: impl Into<String>) -> Self {
        self.data.write().job_id = job_id.into();
        self
    }

    /// Status code and body returned by `submit`.
    pub fn with_submit_response(self, status: u16, body: impl Into<String>) -> Self {
        {
            let mut data = self.data.write();
            data.submit_status = status;
            data.submit_body = body.into();
        }
        self
    }

    /// Exact `Location` header value returned by `submit`.
    pub fn with_location(self, location: impl Into<String>) -> Self {
        self.data.write().location = Some(location.into());
        self
    }

    /// Leave the `Location` header out of the submission response.
    pub fn without_location(self) -> Self {
        self.data.write().location = Some(String::new());
        self
    }

    /// Status reports returned by successive status queries. Once the script
    /// runs out, the last report keeps being returned.
    pub fn with_status_sequence(self, reports: Vec<JobStatusReport>) -> Self {
        self.data.write().status_script = reports.into();
        self
    }

    /// Result payload body.
    pub fn with_result(self, body: impl Into<String>) -> Self {
        {
            let mut data = self.data.write();
            data.result_body = body.into();
            if data.status_script.is_empty() {
                data.last_status = JobStatusReport::ready(data.result_body.len() as u64);
            }
        }
        self
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    pub fn job_id(&self) -> String {
        self.data.read().job_id.clone()
    }

    pub fn submit_count(&self) -> usize {
        self.data.read().submitted_payloads.len()
    }

    pub fn submitted_payloads(&self) -> Vec<String> {
        self.data.read().submitted_payloads.clone()
    }

    pub fn status_query_count(&self) -> usize {
        self.data.read().status_queries.len()
    }

    pub fn download_count(&self) -> usize {
        self.data.read().downloads.len()
    }

    pub fn cancellations(&self) -> Vec<String> {
        self.data.read().cancellations.clone()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> TransportResult<()> {
        if !self.data.read().is_healthy {
            return Err(TransportError::connection("Local transport is not healthy")
                .with_operation(operation));
        }
        Ok(())
    }

    fn check_job(&self, operation: &str, job_type: JobType, job_id: &str) -> TransportResult<()> {
        if self.data.read().job_id != job_id {
            return Err(TransportError::unexpected_status(
                404,
                format!("Unknown request id {}", job_id),
            )
            .with_operation(operation)
            .with_job(job_type.as_str(), job_id));
        }
        Ok(())
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchTransport for LocalTransport {
    async fn submit(&self, job_type: JobType, payload: &str) -> TransportResult<TransportResponse> {
        self.check_health("submit")?;
        let mut data = self.data.write();
        data.submitted_payloads.push(payload.to_string());

        let mut response = TransportResponse::new(data.submit_status, data.submit_body.clone());
        let location = match &data.location {
            Some(location) => location.clone(),
            None => format!("/api/v1/{}/requests/{}", job_type, data.job_id),
        };
        if !location.is_empty() {
            response = response.with_header("Location", location);
        }
        Ok(response)
    }

    async fn job_status(&self, job_type: JobType, job_id: &str) -> TransportResult<JobStatusReport> {
        self.check_health("job_status")?;
        self.check_job("job_status", job_type, job_id)?;
        let mut data = self.data.write();
        data.status_queries.push(job_id.to_string());
        if let Some(next) = data.status_script.pop_front() {
            data.last_status = next;
        }
        Ok(data.last_status.clone())
    }

    async fn download_result(&self, job_type: JobType, job_id: &str) -> TransportResult<RawPayload> {
        self.check_health("download_result")?;
        self.check_job("download_result", job_type, job_id)?;
        let mut data = self.data.write();
        data.downloads.push(job_id.to_string());
        Ok(RawPayload::new(data.result_body.clone()))
    }

    async fn cancel_job(&self, job_type: JobType, job_id: &str) -> TransportResult<()> {
        self.check_health("cancel_job")?;
        self.check_job("cancel_job", job_type, job_id)?;
        self.data.write().cancellations.push(job_id.to_string());
        Ok(())
    }
}
