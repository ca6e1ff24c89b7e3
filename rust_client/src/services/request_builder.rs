//! Search request construction.

use std::collections::BTreeSet;

use crate::error::{SearchError, SearchResult};
use crate::models::{
    format_timestamp, parse_flexible_timestamp, BlockCounts, ConjunctionType, CriteriaBlock,
    Distance, SearchRequest,
};

use super::distance_pairs::{uniform_distance_map, validate_distance_map};

/// Upper bound on criteria blocks across ground, space and events.
pub const MAX_CRITERIA_BLOCKS: usize = 10;

/// Collects search parameters and turns them into a validated [`SearchRequest`].
///
/// # Example
/// ```ignore
/// let request = SearchRequestBuilder::new("2020-01-01T00:00", "2020-01-01T06:59", 500.0)
///     .ground(vec![CriteriaBlock::new().with_programs(["themis-asi"])])
///     .space(vec![CriteriaBlock::new().with_programs(["swarm"])])
///     .conjunction_types([ConjunctionType::Nbtrace])
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    start: String,
    end: String,
    distance: Distance,
    ground: Vec<CriteriaBlock>,
    space: Vec<CriteriaBlock>,
    events: Vec<CriteriaBlock>,
    conjunction_types: Vec<ConjunctionType>,
}

impl SearchRequestBuilder {
    pub fn new(start: impl Into<String>, end: impl Into<String>, distance: impl Into<Distance>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            distance: distance.into(),
            ground: Vec::new(),
            space: Vec::new(),
            events: Vec::new(),
            conjunction_types: Vec::new(),
        }
    }

    pub fn ground(mut self, blocks: Vec<CriteriaBlock>) -> Self {
        self.ground = blocks;
        self
    }

    pub fn space(mut self, blocks: Vec<CriteriaBlock>) -> Self {
        self.space = blocks;
        self
    }

    pub fn events(mut self, blocks: Vec<CriteriaBlock>) -> Self {
        self.events = blocks;
        self
    }

    /// Requested conjunction types; an empty set leaves the choice to the backend.
    pub fn conjunction_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = ConjunctionType>,
    {
        self.conjunction_types = types.into_iter().collect();
        self
    }

    pub fn block_counts(&self) -> BlockCounts {
        BlockCounts::new(self.ground.len(), self.space.len(), self.events.len())
    }

    /// Validate the parameters and assemble the request.
    ///
    /// Checks run in this order: timestamps, block count, distances.
    ///
    /// # Errors
    /// - [`SearchError::TimestampParse`] if either bound cannot be parsed
    /// - [`SearchError::BlockCountExceeded`] for more than [`MAX_CRITERIA_BLOCKS`] blocks
    /// - [`SearchError::InsufficientBlocks`] for fewer than two blocks
    /// - [`SearchError::DistanceValidation`] if a distance map lacks a pairing
    pub fn build(&self) -> SearchResult<SearchRequest> {
        let start = normalize_bound("start", &self.start)?;
        let end = normalize_bound("end", &self.end)?;

        let counts = self.block_counts();
        if counts.total() > MAX_CRITERIA_BLOCKS {
            return Err(SearchError::BlockCountExceeded {
                count: counts.total(),
                max: MAX_CRITERIA_BLOCKS,
            });
        }

        let max_distances = match &self.distance {
            Distance::Scalar(distance) => uniform_distance_map(*distance, counts)?,
            Distance::Map(map) => {
                validate_distance_map(map, counts)?;
                map.clone()
            }
        };

        let conjunction_types: BTreeSet<ConjunctionType> =
            self.conjunction_types.iter().copied().collect();

        Ok(SearchRequest {
            start,
            end,
            ground: self.ground.clone(),
            space: self.space.clone(),
            events: self.events.clone(),
            conjunction_types,
            max_distances,
        })
    }
}

fn normalize_bound(field: &'static str, raw: &str) -> SearchResult<String> {
    parse_flexible_timestamp(raw)
        .map(|dt| format_timestamp(&dt))
        .ok_or_else(|| SearchError::TimestampParse {
            field,
            value: raw.to_string(),
        })
}
