use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One pairwise event inside a conjunction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjunctionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conjunction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e1_source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e2_source: Option<Value>,
    pub start_dt: String,
    pub end_dt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,
    /// Fields the client has no dedicated slot for, passed through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A period during which the searched blocks were within range of each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conjunction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conjunction_type: Option<String>,
    pub start_dt: String,
    pub end_dt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest_epoch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farthest_epoch: Option<String>,
    #[serde(default)]
    pub data_sources: Vec<Value>,
    #[serde(default)]
    pub events: Vec<ConjunctionEvent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized outcome of a conjunction search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConjunctionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub conjunctions: Vec<Conjunction>,
}

impl ConjunctionResult {
    /// The result handed back when a search could not run.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.conjunctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conjunctions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Conjunction> {
        self.conjunctions.iter()
    }
}

impl IntoIterator for ConjunctionResult {
    type Item = Conjunction;
    type IntoIter = std::vec::IntoIter<Conjunction>;

    fn into_iter(self) -> Self::IntoIter {
        self.conjunctions.into_iter()
    }
}
