//! Per-variant append-only store of hook invocation records
//!
//! One recorder exists for each logical build variant and lives for the
//! whole process: it is the audit log of one build session, not per-request
//! state. Appends are synchronous and atomic per record (sharded maps), so
//! concurrent hook invocations never observe a half-written record.

use crate::record::{HookRecord, PLACEHOLDER_LOADER};
use dashmap::DashMap;

/// A distinct logical build target, tracked with its own recorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BuildVariant {
    /// Primary (browser) runtime
    #[default]
    Client,
    /// Alternate server runtime
    Ssr,
}

impl BuildVariant {
    /// Suffix used in report file and directory names.
    pub fn suffix(&self) -> &'static str {
        match self {
            BuildVariant::Client => "",
            BuildVariant::Ssr => "-ssr",
        }
    }
}

/// Append-only accumulation of hook records, keyed by module identifier.
#[derive(Debug, Default)]
pub struct Recorder {
    /// identifier -> transform chain, in completion order
    transform: DashMap<String, Vec<HookRecord>>,
    /// pre-redirection identifier -> genuine redirections
    resolve_id: DashMap<String, Vec<HookRecord>>,
    /// identifier -> raw transform attempts, including no-ops
    transform_counter: DashMap<String, u64>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform record and bump the identifier's invoke counter.
    ///
    /// When the chain is empty or holds no record with content, a
    /// placeholder-loader record carrying `pre_code` is seeded first so the
    /// chain always starts from observable source text.
    pub fn record_transform(&self, id: &str, record: HookRecord, pre_code: &str) {
        self.bump_counter(id);
        let mut chain = self.transform.entry(id.to_string()).or_default();
        if !chain.iter().any(|rec| rec.result.is_some()) {
            let seed = HookRecord::ok(PLACEHOLDER_LOADER, record.start, record.start, pre_code);
            chain.insert(0, seed);
        }
        chain.push(record);
    }

    /// Count a no-op transform attempt without touching the chain.
    pub fn count_transform(&self, id: &str) {
        self.bump_counter(id);
    }

    /// Record a load: the chain restarts from the loader's output.
    pub fn record_load(&self, id: &str, record: HookRecord) {
        self.transform.insert(id.to_string(), vec![record]);
    }

    /// Append a resolve record for `original_id`. Only genuine redirections
    /// are kept: an empty or self-referential result carries no routing
    /// information and is discarded.
    pub fn record_resolve(&self, original_id: &str, record: HookRecord) {
        match record.result.as_deref() {
            Some(result) if !result.is_empty() && result != original_id => {}
            _ => return,
        }
        self.resolve_id
            .entry(original_id.to_string())
            .or_default()
            .push(record);
    }

    fn bump_counter(&self, id: &str) {
        *self.transform_counter.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Most recent redirection target for `id`, if any was recorded.
    pub fn last_resolve_result(&self, id: &str) -> Option<String> {
        self.resolve_id
            .get(id)
            .and_then(|records| records.last().and_then(|rec| rec.result.clone()))
    }

    /// Snapshot of one identifier's transform chain.
    pub fn transform_chain(&self, id: &str) -> Option<Vec<HookRecord>> {
        self.transform.get(id).map(|chain| chain.clone())
    }

    /// Raw transform attempts seen for `id`.
    pub fn transform_count(&self, id: &str) -> u64 {
        self.transform_counter.get(id).map(|n| *n).unwrap_or(0)
    }

    /// Snapshot of every transform chain.
    pub fn transform_entries(&self) -> Vec<(String, Vec<HookRecord>)> {
        self.transform
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Snapshot of every resolve list, keyed by pre-redirection identifier.
    pub fn resolve_entries(&self) -> Vec<(String, Vec<HookRecord>)> {
        self.resolve_id
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
