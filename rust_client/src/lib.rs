//! # AuroraX Rust Client
//!
//! Conjunction search client for the AuroraX auroral-imaging data API.
//!
//! A conjunction search asks the backend for periods where the footprints or
//! locations of several criteria blocks (ground instruments, spacecraft,
//! events) come within a maximum distance of each other. The backend runs the
//! search as an asynchronous job: the request is submitted, the job is polled
//! until it completes, and the result payload is downloaded.
//!
//! ## Architecture
//!
//! - [`models`]: criteria blocks, distance keys/maps, requests, jobs, results
//! - [`services`]: pair generation, request building, the job client, result
//!   normalization and the end-to-end search workflow
//! - [`transport`]: the HTTP seam ([`transport::SearchTransport`]) with a
//!   reqwest implementation and an in-memory one for tests
//! - [`config`]: client configuration from environment variables or TOML
//! - [`error`]: the [`SearchError`] type surfaced by every operation
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use aurorax_rust::{ClientConfig, ConjunctionSearch, CriteriaBlock, SearchOptions};
//! use aurorax_rust::services::SearchRequestBuilder;
//! use aurorax_rust::transport::HttpTransport;
//!
//! let config = ClientConfig::from_env()?;
//! let transport = Arc::new(HttpTransport::new(&config)?);
//! let search = ConjunctionSearch::new(transport, &config);
//!
//! let builder = SearchRequestBuilder::new("2020-01-01T00:00", "2020-01-01T06:59", 500.0)
//!     .ground(vec![CriteriaBlock::new().with_programs(["themis-asi"])])
//!     .space(vec![CriteriaBlock::new().with_programs(["swarm"])]);
//!
//! let result = search.run(&builder, &SearchOptions::default()).await?;
//! println!("{} conjunctions", result.len());
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod transport;

pub use config::{ClientConfig, JobIdExtraction};
pub use error::{SearchError, SearchResult};
pub use models::{
    BlockCategory, BlockCounts, Conjunction, ConjunctionEvent, ConjunctionResult,
    ConjunctionType, CriteriaBlock, Distance, DistanceKey, DistanceMap, SearchRequest,
};
pub use services::{ConjunctionSearch, PollOptions, SearchOptions, SearchOutcome};
