//! Result payload normalization.
//!
//! The backend names the end of a period `end` (sometimes `_end`). The wire
//! records below mirror that layout; [`normalize`] maps them onto the domain
//! records, which use `start_dt`/`end_dt` at both the conjunction and the
//! event level. When a record carries both keys, `end` wins. Nothing else is
//! transformed.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{SearchError, SearchResult};
use crate::models::{Conjunction, ConjunctionEvent, ConjunctionResult, RawPayload};

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(default)]
    conjunction_type: Option<String>,
    #[serde(default)]
    e1_source: Option<Value>,
    #[serde(default)]
    e2_source: Option<Value>,
    start: String,
    #[serde(default)]
    end: Option<String>,
    #[serde(default, rename = "_end")]
    legacy_end: Option<String>,
    #[serde(default)]
    min_distance: Option<f64>,
    #[serde(default)]
    max_distance: Option<f64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WireConjunction {
    #[serde(default)]
    conjunction_type: Option<String>,
    start: String,
    #[serde(default)]
    end: Option<String>,
    #[serde(default, rename = "_end")]
    legacy_end: Option<String>,
    #[serde(default)]
    min_distance: Option<f64>,
    #[serde(default)]
    max_distance: Option<f64>,
    #[serde(default)]
    closest_epoch: Option<String>,
    #[serde(default)]
    farthest_epoch: Option<String>,
    #[serde(default)]
    data_sources: Option<Vec<Value>>,
    #[serde(default)]
    events: Option<Vec<WireEvent>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Payload layouts the backend has been seen to use.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePayload {
    Bare(Vec<WireConjunction>),
    Wrapped {
        #[serde(alias = "data")]
        result: Vec<WireConjunction>,
    },
}

fn resolve_end(end: Option<String>, legacy_end: Option<String>, start: &str) -> SearchResult<String> {
    end.or(legacy_end).ok_or_else(|| {
        SearchError::MalformedResponse(format!("Record starting at {} has no end", start))
    })
}

impl TryFrom<WireEvent> for ConjunctionEvent {
    type Error = SearchError;

    fn try_from(wire: WireEvent) -> SearchResult<Self> {
        let end_dt = resolve_end(wire.end, wire.legacy_end, &wire.start)?;
        Ok(Self {
            conjunction_type: wire.conjunction_type,
            e1_source: wire.e1_source,
            e2_source: wire.e2_source,
            start_dt: wire.start,
            end_dt,
            min_distance: wire.min_distance,
            max_distance: wire.max_distance,
            extra: wire.extra,
        })
    }
}

impl TryFrom<WireConjunction> for Conjunction {
    type Error = SearchError;

    fn try_from(wire: WireConjunction) -> SearchResult<Self> {
        let end_dt = resolve_end(wire.end, wire.legacy_end, &wire.start)?;
        let events = wire
            .events
            .unwrap_or_default()
            .into_iter()
            .map(ConjunctionEvent::try_from)
            .collect::<SearchResult<Vec<_>>>()?;
        Ok(Self {
            conjunction_type: wire.conjunction_type,
            start_dt: wire.start,
            end_dt,
            min_distance: wire.min_distance,
            max_distance: wire.max_distance,
            closest_epoch: wire.closest_epoch,
            farthest_epoch: wire.farthest_epoch,
            data_sources: wire.data_sources.unwrap_or_default(),
            events,
            extra: wire.extra,
        })
    }
}

/// Decode a downloaded payload into a [`ConjunctionResult`].
///
/// # Errors
/// [`SearchError::MalformedResponse`] if the payload is not a list of
/// conjunction records (bare, or under `result`/`data`), or a record has
/// neither `end` nor `_end`.
pub fn normalize(payload: &RawPayload, request_id: Option<&str>) -> SearchResult<ConjunctionResult> {
    let wire: WirePayload = serde_json::from_str(payload.as_str()).map_err(|e| {
        SearchError::MalformedResponse(format!("Result payload is not a conjunction list: {}", e))
    })?;

    let records = match wire {
        WirePayload::Bare(records) | WirePayload::Wrapped { result: records } => records,
    };

    Ok(ConjunctionResult {
        request_id: request_id.map(str::to_string),
        conjunctions: records
            .into_iter()
            .map(Conjunction::try_from)
            .collect::<SearchResult<Vec<_>>>()?,
    })
}
