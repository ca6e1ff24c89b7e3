//! Distance pairing types.
//!
//! Every pair of criteria blocks in a search needs a maximum separation. Pairs
//! are named by [`DistanceKey`]s such as `ground1-space2`, built from
//! 1-based per-category [`BlockLabel`]s.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category a criteria block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    Ground,
    Space,
    Events,
}

impl BlockCategory {
    /// All categories in label order.
    pub const ALL: [BlockCategory; 3] = [Self::Ground, Self::Space, Self::Events];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Space => "space",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of criteria blocks per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockCounts {
    pub ground: usize,
    pub space: usize,
    pub events: usize,
}

impl BlockCounts {
    pub fn new(ground: usize, space: usize, events: usize) -> Self {
        Self {
            ground,
            space,
            events,
        }
    }

    pub fn total(&self) -> usize {
        self.ground + self.space + self.events
    }

    pub fn get(&self, category: BlockCategory) -> usize {
        match category {
            BlockCategory::Ground => self.ground,
            BlockCategory::Space => self.space,
            BlockCategory::Events => self.events,
        }
    }

    /// Block labels in category order (ground, space, events), indices ascending from 1.
    pub fn labels(&self) -> Vec<BlockLabel> {
        BlockCategory::ALL
            .iter()
            .flat_map(|&category| {
                (1..=self.get(category)).map(move |index| BlockLabel { category, index })
            })
            .collect()
    }
}

/// A block's name within a search, e.g. `space2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockLabel {
    pub category: BlockCategory,
    /// 1-based position within the category
    pub index: usize,
}

impl fmt::Display for BlockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.category, self.index)
    }
}

/// Name of one unordered pair of blocks, e.g. `ground1-space2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceKey(String);

impl DistanceKey {
    pub fn new(first: &BlockLabel, second: &BlockLabel) -> Self {
        Self(format!("{}-{}", first, second))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The same pair named in the opposite direction.
    pub fn reversed(&self) -> Self {
        match self.0.split_once('-') {
            Some((first, second)) => Self(format!("{}-{}", second, first)),
            None => self.clone(),
        }
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DistanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DistanceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maximum distance (kilometres) per block pair.
///
/// Keys are plain strings because caller-supplied maps may name pairs the
/// client does not generate itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceMap(BTreeMap<String, f64>);

impl DistanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, distance: f64) -> Option<f64> {
        self.0.insert(key.into(), distance)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for DistanceMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a> IntoIterator for &'a DistanceMap {
    type Item = (&'a String, &'a f64);
    type IntoIter = btree_map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Maximum distance for a search: one value for every pair, or one per pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Distance {
    Scalar(f64),
    Map(DistanceMap),
}

impl From<f64> for Distance {
    fn from(v: f64) -> Self {
        Distance::Scalar(v)
    }
}

impl From<DistanceMap> for Distance {
    fn from(map: DistanceMap) -> Self {
        Distance::Map(map)
    }
}

impl FromStr for Distance {
    type Err = String;

    /// Parse either a number (`500`) or a JSON object (`{"ground1-space1": 500}`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(v) = trimmed.parse::<f64>() {
            return Ok(Distance::Scalar(v));
        }
        serde_json::from_str::<DistanceMap>(trimmed)
            .map(Distance::Map)
            .map_err(|e| format!("Distance must be a number or a JSON object of pairs: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_category_order() {
        let labels: Vec<String> = BlockCounts::new(2, 1, 1)
            .labels()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, vec!["ground1", "ground2", "space1", "events1"]);
    }

    #[test]
    fn test_labels_skip_empty_categories() {
        let labels: Vec<String> = BlockCounts::new(0, 0, 2)
            .labels()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, vec!["events1", "events2"]);
        assert_eq!(BlockCounts::new(0, 0, 2).total(), 2);
    }

    #[test]
    fn test_key_reversal() {
        let ground = BlockLabel {
            category: BlockCategory::Ground,
            index: 1,
        };
        let space = BlockLabel {
            category: BlockCategory::Space,
            index: 2,
        };
        let key = DistanceKey::new(&ground, &space);
        assert_eq!(key.as_str(), "ground1-space2");
        assert_eq!(key.reversed().as_str(), "space2-ground1");
        assert_eq!(key.reversed().reversed(), key);
    }

    #[test]
    fn test_distance_from_str_scalar() {
        assert_eq!(" 500 ".parse::<Distance>().unwrap(), Distance::Scalar(500.0));
        assert_eq!("12.5".parse::<Distance>().unwrap(), Distance::Scalar(12.5));
    }

    #[test]
    fn test_distance_from_str_map() {
        let distance: Distance = r#"{"ground1-space1": 300, "ground1-ground2": 100.5}"#
            .parse()
            .unwrap();
        match distance {
            Distance::Map(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(map.get("ground1-space1"), Some(300.0));
                assert_eq!(map.get("ground1-ground2"), Some(100.5));
            }
            other => panic!("expected a map, got {:?}", other),
        }
    }

    #[test]
    fn test_distance_from_str_rejects_garbage() {
        let err = "far away".parse::<Distance>().unwrap_err();
        assert!(err.contains("number or a JSON object"));
    }

    #[test]
    fn test_distance_map_serializes_as_plain_object() {
        let map: DistanceMap = [("ground1-space1", 500.0)].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"ground1-space1":500.0}"#
        );
    }
}
