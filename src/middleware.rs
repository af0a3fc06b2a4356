//! Request-stage timing for the host dev server
//!
//! The host's request path is an ordered stack of named stage handlers,
//! each running the rest of the stack downstream of itself. Wrapping the
//! stack records, per request key, one `{name, total, self}` entry per
//! stage, where self time is the stage's total minus the previously
//! recorded stage's total, floored at zero. Request keys are normalized by
//! stripping cache-busting timestamp params.

use anyhow::Result;
use dashmap::DashMap;
use futures::future::BoxFuture;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// One stage's contribution to one request, microseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    pub name: String,
    pub total: u64,
    #[serde(rename = "self")]
    pub self_time: u64,
}

/// Per-request-key stage timings.
pub struct StagePerf {
    records: DashMap<String, Vec<StageTiming>>,
    timestamp_re: Regex,
    trailing_separator_re: Regex,
}

impl Default for StagePerf {
    fn default() -> Self {
        Self::new()
    }
}

impl StagePerf {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            timestamp_re: Regex::new(r"\bt=\d{13}&?\b").expect("static pattern"),
            trailing_separator_re: Regex::new(r"[?&]$").expect("static pattern"),
        }
    }

    /// Strip cache-busting `t=<13 digits>` params and any separator they
    /// leave dangling.
    pub fn normalize_key(&self, raw: &str) -> String {
        let stripped = self.timestamp_re.replace_all(raw, "");
        self.trailing_separator_re
            .replace_all(&stripped, "")
            .into_owned()
    }

    /// Start a fresh timing list for a request key. Called when the first
    /// stage of the stack sees the request again.
    pub fn begin(&self, key: &str) {
        self.records.insert(key.to_string(), Vec::new());
    }

    /// Record one stage's total; self time is derived from the previous
    /// stage's total on the same key.
    pub fn record(&self, key: &str, name: &str, total: u64) {
        let mut timings = self.records.entry(key.to_string()).or_default();
        let self_time = match timings.last() {
            Some(prev) => total.saturating_sub(prev.total),
            None => total,
        };
        timings.push(StageTiming {
            name: name.to_string(),
            total,
            self_time,
        });
    }

    /// Timings recorded for one request key.
    pub fn timings(&self, key: &str) -> Option<Vec<StageTiming>> {
        self.records.get(key).map(|timings| timings.clone())
    }

    /// Snapshot of every request key.
    pub fn snapshot(&self) -> HashMap<String, Vec<StageTiming>> {
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

/// Arguments a stage handler receives.
#[derive(Debug, Clone)]
pub struct StageArgs {
    pub url: String,
}

/// One named handler in the request-processing stack.
pub type StageHandler = Arc<dyn Fn(StageArgs) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Decorate one stage handler. `first` marks the head of the stack, which
/// resets the request key's timing list. The handler's outcome is forwarded
/// unchanged; only successful completions are timed.
pub fn wrap_stage(
    perf: Arc<StagePerf>,
    name: impl Into<String>,
    first: bool,
    handler: StageHandler,
) -> StageHandler {
    let name = name.into();
    Arc::new(move |args: StageArgs| {
        let perf = perf.clone();
        let handler = handler.clone();
        let name = name.clone();
        Box::pin(async move {
            let key = perf.normalize_key(&args.url);
            if first {
                perf.begin(&key);
            }
            let start = Instant::now();
            let outcome = (handler)(args).await;
            if outcome.is_ok() {
                perf.record(&key, &name, start.elapsed().as_micros() as u64);
            }
            outcome
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_time_is_delta_from_previous_stage() {
        let perf = StagePerf::new();
        perf.begin("/app");
        // outermost stage completes last with the largest total
        perf.record("/app", "compression", 40);
        perf.record("/app", "static-serve", 90);

        let timings = perf.timings("/app").unwrap();
        assert_eq!(timings[0].self_time, 40);
        assert_eq!(timings[1].self_time, 50);
    }

    #[test]
    fn test_self_time_floored_at_zero() {
        let perf = StagePerf::new();
        perf.record("/app", "a", 90);
        perf.record("/app", "b", 40);

        let timings = perf.timings("/app").unwrap();
        assert_eq!(timings[1].self_time, 0);
    }

    #[test]
    fn test_begin_clears_previous_request() {
        let perf = StagePerf::new();
        perf.record("/app", "a", 10);
        perf.begin("/app");

        assert!(perf.timings("/app").unwrap().is_empty());
    }

    #[test]
    fn test_timestamp_param_stripped_from_keys() {
        let perf = StagePerf::new();
        assert_eq!(
            perf.normalize_key("/src/main.ts?t=1736899200000"),
            "/src/main.ts"
        );
        assert_eq!(
            perf.normalize_key("/src/main.ts?t=1736899200000&raw"),
            "/src/main.ts?raw"
        );
        // short numbers are real query params, not cache busters
        assert_eq!(perf.normalize_key("/api?t=42"), "/api?t=42");
    }

    #[test]
    fn test_stage_timing_serializes_self_keyword() {
        let timing = StageTiming {
            name: "static-serve".to_string(),
            total: 90,
            self_time: 50,
        };
        let json = serde_json::to_string(&timing).unwrap();
        assert!(json.contains("\"self\":50"));
    }

    #[tokio::test]
    async fn test_wrapped_stage_records_and_forwards() {
        let perf = Arc::new(StagePerf::new());
        let handler: StageHandler = Arc::new(|_| Box::pin(async { Ok(()) }));
        let wrapped = wrap_stage(perf.clone(), "static-serve", true, handler);

        wrapped(StageArgs {
            url: "/index.html?t=1736899200000".to_string(),
        })
        .await
        .unwrap();

        let timings = perf.timings("/index.html").unwrap();
        assert_eq!(timings.len(), 1);
        assert_eq!(timings[0].name, "static-serve");
    }

    #[tokio::test]
    async fn test_failed_stage_not_timed_but_error_forwarded() {
        let perf = Arc::new(StagePerf::new());
        let handler: StageHandler =
            Arc::new(|_| Box::pin(async { Err(anyhow::anyhow!("bad gateway")) }));
        let wrapped = wrap_stage(perf.clone(), "proxy", true, handler);

        let err = wrapped(StageArgs {
            url: "/api".to_string(),
        })
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "bad gateway");
        assert!(perf.timings("/api").unwrap().is_empty());
    }
}
