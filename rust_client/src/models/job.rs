//! Asynchronous search job types.
//!
//! The backend runs each search as a job. These types describe the job's
//! lifecycle on the client side and the status document the backend returns
//! while the job runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of backend job; selects the endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Conjunctions,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conjunctions => "conjunctions",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side lifecycle of a search job.
///
/// `Idle -> Submitted -> Polling -> Ready -> Fetched`, with `Failed` reachable
/// from any state that is not terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Idle,
    Submitted,
    Polling,
    Ready,
    Fetched,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fetched | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitted => "submitted",
            Self::Polling => "polling",
            Self::Ready => "ready",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a submitted job, issued by
/// [`crate::services::AsyncJobClient::submit`].
///
/// Deliberately not `Clone`: a handle belongs to the single search call that
/// created it.
#[derive(Debug, PartialEq, Eq)]
pub struct JobHandle {
    job_id: String,
    job_type: JobType,
}

impl JobHandle {
    pub(crate) fn new(job_id: impl Into<String>, job_type: JobType) -> Self {
        Self {
            job_id: job_id.into(),
            job_type,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn job_type(&self) -> JobType {
        self.job_type
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
    #[serde(other)]
    Other,
}

/// A log line the backend attached to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLogEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub level: LogLevel,
    pub summary: String,
}

/// Job status as seen by the client after one status query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobStatusReport {
    pub completed: bool,
    pub error_condition: bool,
    /// Result payload size in bytes, once known
    pub file_size: Option<u64>,
    pub result_count: Option<u64>,
    pub logs: Vec<JobLogEntry>,
}

impl JobStatusReport {
    /// A job that is still running.
    pub fn pending() -> Self {
        Self::default()
    }

    /// A completed job whose payload is `file_size` bytes.
    pub fn ready(file_size: u64) -> Self {
        Self {
            completed: true,
            file_size: Some(file_size),
            ..Default::default()
        }
    }

    /// A job the backend gave up on.
    pub fn failed(summary: impl Into<String>) -> Self {
        Self {
            completed: true,
            error_condition: true,
            logs: vec![JobLogEntry {
                timestamp: None,
                level: LogLevel::Error,
                summary: summary.into(),
            }],
            ..Default::default()
        }
    }

    /// Most recent error-level log summary, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.logs
            .iter()
            .rev()
            .find(|entry| entry.level == LogLevel::Error)
            .map(|entry| entry.summary.as_str())
    }
}

/// `search_request` member of the status document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestStatus {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub completed_timestamp: Option<String>,
    #[serde(default)]
    pub error_condition: Option<bool>,
}

/// `search_result` member of the status document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultStatus {
    #[serde(default)]
    pub data_uri: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub result_count: Option<u64>,
}

/// Status document returned by the backend for a job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub search_request: RequestStatus,
    #[serde(default)]
    pub search_result: Option<ResultStatus>,
    #[serde(default)]
    pub logs: Vec<JobLogEntry>,
}

impl From<JobStatusResponse> for JobStatusReport {
    fn from(response: JobStatusResponse) -> Self {
        let result = response.search_result.unwrap_or_default();
        Self {
            completed: response.search_request.completed_timestamp.is_some(),
            error_condition: response.search_request.error_condition.unwrap_or(false),
            file_size: result.file_size,
            result_count: result.result_count,
            logs: response.logs,
        }
    }
}

/// Undecoded result body as downloaded from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload(String);

impl RawPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for RawPayload {
    fn from(body: String) -> Self {
        Self(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_document_running() {
        let response: JobStatusResponse = serde_json::from_str(
            r#"{
                "search_request": {"request_id": "abc123", "completed_timestamp": null},
                "search_result": null,
                "logs": [{"level": "info", "summary": "search started", "timestamp": "2024-01-01T00:00:00"}]
            }"#,
        )
        .unwrap();
        let report = JobStatusReport::from(response);
        assert!(!report.completed);
        assert!(!report.error_condition);
        assert_eq!(report.file_size, None);
        assert_eq!(report.logs.len(), 1);
        assert_eq!(report.logs[0].level, LogLevel::Info);
    }

    #[test]
    fn test_status_document_complete() {
        let response: JobStatusResponse = serde_json::from_str(
            r#"{
                "search_request": {"completed_timestamp": "2024-01-01T00:00:05", "error_condition": false},
                "search_result": {"file_size": 1024, "result_count": 3, "data_uri": "/data"},
                "logs": []
            }"#,
        )
        .unwrap();
        let report = JobStatusReport::from(response);
        assert!(report.completed);
        assert_eq!(report.file_size, Some(1024));
        assert_eq!(report.result_count, Some(3));
    }

    #[test]
    fn test_status_document_error_condition() {
        let response: JobStatusResponse = serde_json::from_str(
            r#"{
                "search_request": {"completed_timestamp": "2024-01-01T00:00:05", "error_condition": true},
                "logs": [
                    {"level": "warning", "summary": "slow"},
                    {"level": "error", "summary": "query exceeded limits"},
                    {"level": "critical", "summary": "unknown level"}
                ]
            }"#,
        )
        .unwrap();
        let report = JobStatusReport::from(response);
        assert!(report.error_condition);
        assert_eq!(report.logs[0].level, LogLevel::Warn);
        assert_eq!(report.logs[2].level, LogLevel::Other);
        assert_eq!(report.last_error(), Some("query exceeded limits"));
    }

    #[test]
    fn test_report_constructors() {
        assert!(!JobStatusReport::pending().completed);
        assert_eq!(JobStatusReport::ready(10).file_size, Some(10));
        let failed = JobStatusReport::failed("boom");
        assert!(failed.error_condition);
        assert_eq!(failed.last_error(), Some("boom"));
    }

    #[test]
    fn test_job_state_terminal() {
        assert!(JobState::Fetched.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Ready.is_terminal());
        assert_eq!(JobState::default(), JobState::Idle);
    }
}
