use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::criteria::CriteriaBlock;
use super::distance::{BlockCounts, DistanceMap};
use crate::error::{SearchError, SearchResult};

/// How spatial proximity is measured for a conjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConjunctionType {
    /// North magnetic footprint trace
    Nbtrace,
    /// South magnetic footprint trace
    Sbtrace,
    /// Raw geographic location
    Geographic,
}

impl ConjunctionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nbtrace => "nbtrace",
            Self::Sbtrace => "sbtrace",
            Self::Geographic => "geographic",
        }
    }
}

impl fmt::Display for ConjunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConjunctionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nbtrace" => Ok(Self::Nbtrace),
            "sbtrace" => Ok(Self::Sbtrace),
            "geographic" => Ok(Self::Geographic),
            _ => Err(format!(
                "Unknown conjunction type '{}'. Use nbtrace, sbtrace or geographic.",
                s
            )),
        }
    }
}

/// A validated conjunction search, ready to be serialized and submitted.
///
/// Built by [`crate::services::SearchRequestBuilder`]; timestamps are already
/// normalized to `YYYY-MM-DDTHH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub start: String,
    pub end: String,
    pub ground: Vec<CriteriaBlock>,
    pub space: Vec<CriteriaBlock>,
    pub events: Vec<CriteriaBlock>,
    pub conjunction_types: BTreeSet<ConjunctionType>,
    pub max_distances: DistanceMap,
}

impl SearchRequest {
    pub fn block_counts(&self) -> BlockCounts {
        BlockCounts::new(self.ground.len(), self.space.len(), self.events.len())
    }

    /// JSON body sent to the search endpoint.
    pub fn to_payload(&self) -> SearchResult<String> {
        serde_json::to_string(self).map_err(|e| SearchError::Serialization(e.to_string()))
    }

    /// Indented JSON, used for dry runs.
    pub fn to_pretty_payload(&self) -> SearchResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SearchError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conjunction_type_from_str() {
        assert_eq!("NBTRACE".parse::<ConjunctionType>().unwrap(), ConjunctionType::Nbtrace);
        assert_eq!(" sbtrace".parse::<ConjunctionType>().unwrap(), ConjunctionType::Sbtrace);
        assert_eq!(
            "geographic".parse::<ConjunctionType>().unwrap(),
            ConjunctionType::Geographic
        );
        assert!("magnetic".parse::<ConjunctionType>().is_err());
    }

    #[test]
    fn test_payload_shape() {
        let request = SearchRequest {
            start: "2020-01-01T00:00:00".to_string(),
            end: "2020-01-01T06:59:59".to_string(),
            ground: vec![CriteriaBlock::new().with_programs(["themis-asi"])],
            space: vec![CriteriaBlock::new().with_programs(["swarm"])],
            events: vec![],
            conjunction_types: [ConjunctionType::Geographic, ConjunctionType::Nbtrace]
                .into_iter()
                .collect(),
            max_distances: [("ground1-space1", 500.0)].into_iter().collect(),
        };

        let value: serde_json::Value = serde_json::from_str(&request.to_payload().unwrap()).unwrap();
        assert_eq!(value["start"], "2020-01-01T00:00:00");
        assert_eq!(value["end"], "2020-01-01T06:59:59");
        assert_eq!(value["ground"][0]["programs"], json!(["themis-asi"]));
        assert_eq!(value["events"], json!([]));
        assert_eq!(value["conjunction_types"], json!(["nbtrace", "geographic"]));
        assert_eq!(value["max_distances"], json!({"ground1-space1": 500.0}));
        assert_eq!(request.block_counts(), BlockCounts::new(1, 1, 0));
    }
}
