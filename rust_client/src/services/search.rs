//! End-to-end conjunction search workflow.
//!
//! [`ConjunctionSearch::execute`] runs build, submit, poll, fetch and
//! normalize, and reports every failure as a typed error.
//! [`ConjunctionSearch::run`] is the caller-facing entry point: anything but a
//! transport failure is logged and turned into an empty result.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use super::job_client::{AsyncJobClient, PollOptions};
use super::normalizer::normalize;
use super::request_builder::SearchRequestBuilder;
use crate::config::{ClientConfig, JobIdExtraction};
use crate::error::{SearchError, SearchResult};
use crate::models::ConjunctionResult;
use crate::transport::SearchTransport;

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub poll: PollOptions,
    /// Stop before submission and hand back the serialized request
    pub dry_run: bool,
    /// Report progress at info level
    pub verbose: bool,
}

/// How a search call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Dry run: the request that would have been submitted.
    DryRun { payload: String },
    Completed(ConjunctionResult),
}

impl SearchOptions {
    /// Options polling at the configured interval, with no deadline.
    ///
    /// An interval that does not fit a [`Duration`] falls back to the default.
    pub fn from_config(config: &ClientConfig) -> Self {
        let poll = match Duration::try_from_secs_f64(config.poll_interval_secs) {
            Ok(interval) => PollOptions::default().with_interval(interval),
            Err(_) => {
                warn!(
                    "Ignoring unusable poll interval {}s, using the default",
                    config.poll_interval_secs
                );
                PollOptions::default()
            }
        };
        Self {
            poll,
            ..Self::default()
        }
    }
}

impl SearchOutcome {
    /// The conjunctions found; empty for a dry run.
    pub fn into_result(self) -> ConjunctionResult {
        match self {
            SearchOutcome::DryRun { .. } => ConjunctionResult::empty(),
            SearchOutcome::Completed(result) => result,
        }
    }
}

/// Runs conjunction searches against one transport.
///
/// The transport is shared; every call gets its own [`AsyncJobClient`], so
/// independent searches may run concurrently.
#[derive(Clone)]
pub struct ConjunctionSearch {
    transport: Arc<dyn SearchTransport>,
    extraction: JobIdExtraction,
}

impl ConjunctionSearch {
    pub fn new(transport: Arc<dyn SearchTransport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            extraction: config.job_id_extraction,
        }
    }

    /// Build, submit, wait for and normalize one search.
    ///
    /// Validation happens before anything is sent. If a bounded wait ends
    /// (deadline or cancellation), the backend job is cancelled on a
    /// best-effort basis before the error is returned.
    pub async fn execute(
        &self,
        builder: &SearchRequestBuilder,
        options: &SearchOptions,
    ) -> SearchResult<SearchOutcome> {
        let request = builder.build()?;

        if options.dry_run {
            let payload = request.to_pretty_payload()?;
            info!("Dry run, search request not submitted");
            return Ok(SearchOutcome::DryRun { payload });
        }

        let mut client =
            AsyncJobClient::new(Arc::clone(&self.transport), self.extraction).verbose(options.verbose);
        let handle = client.submit(&request).await?;

        if let Err(err) = client.poll_until_ready(&handle, &options.poll).await {
            if matches!(err, SearchError::PollTimeout { .. } | SearchError::Cancelled { .. }) {
                if let Err(cancel_err) = client.cancel(&handle).await {
                    warn!("Could not cancel search {}: {}", handle.job_id(), cancel_err);
                }
            }
            return Err(err);
        }

        let payload = client.fetch_result(&handle).await?;
        let result = normalize(&payload, Some(handle.job_id()))?;

        if let Some(expected) = client.result_count() {
            if expected as usize != result.len() {
                warn!(
                    "Search {} reported {} conjunctions but the payload holds {}",
                    handle.job_id(),
                    expected,
                    result.len()
                );
            }
        }

        Ok(SearchOutcome::Completed(result))
    }

    /// Run a search, turning every non-transport failure into an empty result.
    ///
    /// # Errors
    /// Only [`SearchError::Transport`] is returned; all other failures are
    /// logged with a diagnostic and yield [`ConjunctionResult::empty`].
    pub async fn run(
        &self,
        builder: &SearchRequestBuilder,
        options: &SearchOptions,
    ) -> SearchResult<ConjunctionResult> {
        match self.execute(builder, options).await {
            Ok(SearchOutcome::DryRun { payload }) => {
                info!("Search request payload:\n{}", payload);
                Ok(ConjunctionResult::empty())
            }
            Ok(SearchOutcome::Completed(result)) => Ok(result),
            Err(err) if err.is_transport() => Err(err),
            Err(err) => {
                error!("Conjunction search failed ({}): {}", err.kind(), err);
                Ok(ConjunctionResult::empty())
            }
        }
    }
}
