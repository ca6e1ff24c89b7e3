//! Distance pair generation and distance map validation.
//!
//! A search with N criteria blocks needs a maximum distance for each of the
//! C(N, 2) unordered block pairs. Pairs are named once, in the direction in
//! which they are first met when walking the labels in category order.

use std::collections::HashSet;

use log::debug;

use crate::error::{SearchError, SearchResult};
use crate::models::{BlockCounts, DistanceKey, DistanceMap};

/// Enumerate the distance keys a search with `counts` blocks must provide.
///
/// Keys come out in a stable order: labels are walked in category order
/// (ground, space, events) with ascending indices.
///
/// # Errors
/// [`SearchError::InsufficientBlocks`] when fewer than two blocks are given.
pub fn generate_distance_keys(counts: BlockCounts) -> SearchResult<Vec<DistanceKey>> {
    let total = counts.total();
    if total < 2 {
        return Err(SearchError::InsufficientBlocks { count: total });
    }

    let labels = counts.labels();
    let mut seen: HashSet<DistanceKey> = HashSet::with_capacity(total * (total - 1) / 2);
    let mut keys = Vec::with_capacity(total * (total - 1) / 2);

    for (i, first) in labels.iter().enumerate() {
        for (j, second) in labels.iter().enumerate() {
            if i == j {
                continue;
            }
            let key = DistanceKey::new(first, second);
            if seen.contains(&key) || seen.contains(&key.reversed()) {
                continue;
            }
            seen.insert(key.clone());
            keys.push(key);
        }
    }

    Ok(keys)
}

/// Check that `map` names a distance for every pair of a search with `counts` blocks.
///
/// Keys in `map` beyond the required ones are accepted and sent along as-is.
///
/// # Errors
/// - [`SearchError::DistanceValidation`] naming the first missing key
/// - [`SearchError::InsufficientBlocks`] when fewer than two blocks are given
pub fn validate_distance_map(map: &DistanceMap, counts: BlockCounts) -> SearchResult<()> {
    let expected = generate_distance_keys(counts)?;

    if let Some(missing) = expected.iter().find(|key| !map.contains_key(key.as_str())) {
        return Err(SearchError::DistanceValidation {
            missing_key: missing.to_string(),
        });
    }

    if map.len() > expected.len() {
        debug!(
            "Distance map has {} entries beyond the {} required pairings",
            map.len() - expected.len(),
            expected.len()
        );
    }

    Ok(())
}

/// Assign the same distance to every required pair.
pub fn uniform_distance_map(distance: f64, counts: BlockCounts) -> SearchResult<DistanceMap> {
    Ok(generate_distance_keys(counts)?
        .into_iter()
        .map(|key| (key.into_string(), distance))
        .collect())
}

#[cfg(test)]
#[path = "distance_pairs_tests.rs"]
mod distance_pairs_tests;
