//! Asynchronous job lifecycle: submit, poll, fetch.
//!
//! One [`AsyncJobClient`] drives exactly one backend job:
//!
//! ```text
//! Idle --submit--> Submitted --poll--> Polling --complete--> Ready --fetch--> Fetched
//!   \                 \                   \                     \
//!    +-----------------+-------------------+---------------------+--> Failed
//! ```
//!
//! Polls run strictly one after another. Transport failures are surfaced
//! immediately and never retried here.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::JobIdExtraction;
use crate::error::{SearchError, SearchResult};
use crate::models::{JobHandle, JobState, JobStatusReport, JobType, RawPayload, SearchRequest};
use crate::transport::{SearchTransport, TransportError};

/// Status code the backend uses to accept a search.
pub const ACCEPTED_STATUS: u16 = 202;

/// Width of the trailing job id window for [`JobIdExtraction::FixedWidth`].
pub const JOB_ID_WIDTH: usize = 36;

/// Header carrying the job id of an accepted search.
pub const LOCATION_HEADER: &str = "location";

/// How long and how often to poll.
///
/// Without a deadline or cancellation token the wait is unbounded.
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub deadline: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            deadline: None,
            cancel: None,
        }
    }
}

impl PollOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Read the job id out of a `Location` header value.
///
/// Returns `None` when no non-empty id can be found.
pub fn extract_job_id(location: &str, strategy: JobIdExtraction) -> Option<String> {
    let value = location.trim();
    match strategy {
        JobIdExtraction::PathSegment => {
            let path = value.split(['?', '#']).next().unwrap_or_default();
            path.rsplit('/')
                .next()
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        }
        JobIdExtraction::FixedWidth => value
            .char_indices()
            .rev()
            .nth(JOB_ID_WIDTH - 1)
            .map(|(offset, _)| value[offset..].to_string()),
    }
}

/// Human-readable byte count, e.g. `512 bytes` or `1.50 MB` (base 1024).
pub fn format_byte_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Drives one search job through its lifecycle.
pub struct AsyncJobClient {
    transport: Arc<dyn SearchTransport>,
    job_type: JobType,
    extraction: JobIdExtraction,
    verbose: bool,
    state: JobState,
    job_id: Option<String>,
    file_size: Option<u64>,
    result_count: Option<u64>,
    status_queries: usize,
}

impl AsyncJobClient {
    pub fn new(transport: Arc<dyn SearchTransport>, extraction: JobIdExtraction) -> Self {
        Self {
            transport,
            job_type: JobType::Conjunctions,
            extraction,
            verbose: false,
            state: JobState::Idle,
            job_id: None,
            file_size: None,
            result_count: None,
            status_queries: 0,
        }
    }

    /// Report progress at info level instead of debug.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Result size in bytes, known once the job is ready.
    pub fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    pub fn result_count(&self) -> Option<u64> {
        self.result_count
    }

    /// Result size for progress display, known once the job is ready.
    pub fn result_size_display(&self) -> Option<String> {
        self.file_size.map(format_byte_size)
    }

    /// Number of status queries issued so far.
    pub fn status_queries(&self) -> usize {
        self.status_queries
    }

    fn progress(&self, message: fmt::Arguments<'_>) {
        if self.verbose {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    fn fail(&mut self, err: impl Into<SearchError>) -> SearchError {
        self.state = JobState::Failed;
        err.into()
    }

    fn expect_state(
        &self,
        handle: &JobHandle,
        expected: &'static str,
        allowed: &[JobState],
    ) -> SearchResult<()> {
        let owned = handle.job_type() == self.job_type
            && self.job_id.as_deref() == Some(handle.job_id());
        let actual = if owned { self.state } else { JobState::Idle };
        if !owned || !allowed.contains(&actual) {
            return Err(SearchError::InvalidJobState {
                job_id: handle.job_id().to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Submit `request` and obtain the handle of the created job.
    ///
    /// # Errors
    /// - [`SearchError::Transport`] on network failure, or when the backend
    ///   answers with anything but `202 Accepted` (the raw body is kept)
    /// - [`SearchError::MalformedResponse`] when no job id can be extracted
    pub async fn submit(&mut self, request: &SearchRequest) -> SearchResult<JobHandle> {
        if self.state != JobState::Idle {
            return Err(SearchError::InvalidJobState {
                job_id: self.job_id.clone().unwrap_or_default(),
                expected: "idle",
                actual: self.state,
            });
        }

        let payload = match request.to_payload() {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e)),
        };
        self.progress(format_args!(
            "Submitting {} search ({} bytes)",
            self.job_type,
            payload.len()
        ));

        let response = match self.transport.submit(self.job_type, &payload).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e.with_operation("submit"))),
        };

        if response.status != ACCEPTED_STATUS {
            warn!(
                "Search submission rejected with status {}: {}",
                response.status,
                response.body.trim()
            );
            let err = TransportError::unexpected_status(response.status, response.body.trim())
                .with_operation("submit");
            return Err(self.fail(err));
        }

        let job_id = match response.header(LOCATION_HEADER) {
            Some(location) => extract_job_id(location, self.extraction),
            None => None,
        };
        let Some(job_id) = job_id else {
            let detail = match response.header(LOCATION_HEADER) {
                Some(location) => format!("no job id in Location header '{}'", location),
                None => "accepted response has no Location header".to_string(),
            };
            return Err(self.fail(SearchError::MalformedResponse(detail)));
        };

        self.progress(format_args!("Search submitted, request id {}", job_id));
        self.state = JobState::Submitted;
        self.job_id = Some(job_id.clone());
        Ok(JobHandle::new(job_id, self.job_type))
    }

    /// Query the job status every `options.interval` until the backend
    /// reports completion.
    ///
    /// A deadline or cancellation ends the wait with the job still in the
    /// `Polling` state, so the caller may resume polling or [`cancel`](Self::cancel).
    ///
    /// # Errors
    /// - [`SearchError::JobFailed`] if the backend flags an error condition
    /// - [`SearchError::PollTimeout`] / [`SearchError::Cancelled`]
    /// - [`SearchError::Transport`] on any failed status query
    pub async fn poll_until_ready(
        &mut self,
        handle: &JobHandle,
        options: &PollOptions,
    ) -> SearchResult<JobStatusReport> {
        self.expect_state(handle, "submitted", &[JobState::Submitted, JobState::Polling])?;
        self.state = JobState::Polling;
        self.progress(format_args!("Waiting for search {} to complete", handle.job_id()));

        let started = Instant::now();
        loop {
            if options.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                return Err(SearchError::Cancelled {
                    job_id: handle.job_id().to_string(),
                });
            }

            let report = match self
                .transport
                .job_status(handle.job_type(), handle.job_id())
                .await
            {
                Ok(report) => report,
                Err(e) => return Err(self.fail(e.with_operation("job_status"))),
            };
            self.status_queries += 1;

            if report.error_condition {
                let detail = report
                    .last_error()
                    .unwrap_or("backend reported an error condition")
                    .to_string();
                return Err(self.fail(SearchError::JobFailed {
                    job_id: handle.job_id().to_string(),
                    detail,
                }));
            }

            if report.completed {
                self.state = JobState::Ready;
                self.file_size = report.file_size;
                self.result_count = report.result_count;
                match self.result_size_display() {
                    Some(size) => self.progress(format_args!("Search complete, {} of results", size)),
                    None => self.progress(format_args!("Search complete")),
                }
                return Ok(report);
            }

            let mut wait = options.interval;
            if let Some(deadline) = options.deadline {
                let elapsed = started.elapsed();
                if elapsed >= deadline {
                    return Err(SearchError::PollTimeout {
                        job_id: handle.job_id().to_string(),
                        waited: elapsed,
                    });
                }
                wait = wait.min(deadline - elapsed);
            }

            match &options.cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => {
                            return Err(SearchError::Cancelled {
                                job_id: handle.job_id().to_string(),
                            });
                        }
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                None => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Download the result payload of a ready job.
    pub async fn fetch_result(&mut self, handle: &JobHandle) -> SearchResult<RawPayload> {
        self.expect_state(handle, "ready", &[JobState::Ready])?;
        match self.result_size_display() {
            Some(size) => self.progress(format_args!("Downloading {} of results", size)),
            None => self.progress(format_args!("Downloading results")),
        }

        let payload = match self
            .transport
            .download_result(handle.job_type(), handle.job_id())
            .await
        {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e.with_operation("download_result"))),
        };

        self.state = JobState::Fetched;
        self.progress(format_args!("Retrieved {}", format_byte_size(payload.len() as u64)));
        Ok(payload)
    }

    /// Ask the backend to discard the job. The client ends up `Failed`.
    pub async fn cancel(&mut self, handle: &JobHandle) -> SearchResult<()> {
        self.expect_state(
            handle,
            "submitted, polling or ready",
            &[JobState::Submitted, JobState::Polling, JobState::Ready],
        )?;
        self.state = JobState::Failed;
        self.transport
            .cancel_job(handle.job_type(), handle.job_id())
            .await
            .map_err(|e| SearchError::from(e.with_operation("cancel_job")))?;
        self.progress(format_args!("Cancelled search {}", handle.job_id()));
        Ok(())
    }
}

impl fmt::Debug for AsyncJobClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncJobClient")
            .field("job_type", &self.job_type)
            .field("state", &self.state)
            .field("job_id", &self.job_id)
            .field("status_queries", &self.status_queries)
            .finish()
    }
}
