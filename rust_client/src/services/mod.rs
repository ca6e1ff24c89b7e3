//! Conjunction search services.
//!
//! - [`distance_pairs`]: distance key generation and distance map validation
//! - [`request_builder`]: validated request construction
//! - [`job_client`]: submit / poll / fetch lifecycle of one backend job
//! - [`normalizer`]: wire payload to domain records
//! - [`search`]: the end-to-end workflow

pub mod distance_pairs;
pub mod job_client;
pub mod normalizer;
pub mod request_builder;
pub mod search;

pub use distance_pairs::{generate_distance_keys, uniform_distance_map, validate_distance_map};
pub use job_client::{extract_job_id, format_byte_size, AsyncJobClient, PollOptions};
pub use normalizer::normalize;
pub use request_builder::{SearchRequestBuilder, MAX_CRITERIA_BLOCKS};
pub use search::{ConjunctionSearch, SearchOptions, SearchOutcome};
