#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use aurorax_rust::services::SearchRequestBuilder;
use aurorax_rust::CriteriaBlock;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with `AURORAX_*` (or any other) variables temporarily changed.
///
/// Access is serialized across tests and the previous values are restored
/// even if `f` panics.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::apply(changes);
    f()
}

/// Every variable `ClientConfig::from_env` reads, unset.
pub const CLEAN_ENV: [(&str, Option<&str>); 7] = [
    ("AURORAX_BASE_URL", None),
    ("AURORAX_API_KEY", None),
    ("AURORAX_CLIENT_VERSION", None),
    ("AURORAX_CONNECT_TIMEOUT", None),
    ("AURORAX_REQUEST_TIMEOUT", None),
    ("AURORAX_JOB_ID_EXTRACTION", None),
    ("AURORAX_POLL_INTERVAL", None),
];

struct ScopedEnv {
    previous: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let previous = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { previous }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.previous.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// One THEMIS ground block against one Swarm space block, 500 km apart.
pub fn themis_swarm_search() -> SearchRequestBuilder {
    SearchRequestBuilder::new("2020-01-01T00:00:00", "2020-01-01T06:59:59", 500.0)
        .ground(vec![CriteriaBlock::new().with_programs(["themis-asi"])])
        .space(vec![CriteriaBlock::new().with_programs(["swarm"])])
}

/// A result payload holding a single conjunction in the backend's layout.
pub const ONE_CONJUNCTION: &str = r#"[
  {
    "conjunction_type": "nbtrace",
    "start": "2020-01-01T00:00:00",
    "_end": "2020-01-01T00:01:59",
    "min_distance": 85.2,
    "max_distance": 401.7,
    "closest_epoch": "2020-01-01T00:01:00",
    "farthest_epoch": "2020-01-01T00:00:00",
    "data_sources": [
      {"identifier": 1, "program": "themis-asi", "platform": "gillam"},
      {"identifier": 3, "program": "swarm", "platform": "swarma"}
    ],
    "events": [
      {
        "conjunction_type": "nbtrace",
        "e1_source": {"identifier": 1},
        "e2_source": {"identifier": 3},
        "start": "2020-01-01T00:00:00",
        "_end": "2020-01-01T00:01:59",
        "min_distance": 85.2,
        "max_distance": 401.7
      }
    ]
  }
]"#;
