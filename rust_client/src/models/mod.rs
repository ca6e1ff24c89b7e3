//! Domain types for conjunction searches.

pub mod criteria;
pub mod distance;
pub mod job;
pub mod request;
pub mod result;
pub mod time;

pub use criteria::{
    CriteriaBlock, Hemisphere, LogicalOperator, MetadataExpression, MetadataFilter,
};
pub use distance::{BlockCategory, BlockCounts, BlockLabel, Distance, DistanceKey, DistanceMap};
pub use job::{
    JobHandle, JobLogEntry, JobState, JobStatusReport, JobStatusResponse, JobType, LogLevel,
    RawPayload,
};
pub use request::{ConjunctionType, SearchRequest};
pub use result::{Conjunction, ConjunctionEvent, ConjunctionResult};
pub use time::{format_timestamp, parse_flexible_timestamp};
