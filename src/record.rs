//! Hook invocation records and the derived views built from them
//!
//! A [`HookRecord`] is one observed invocation of a plugin hook for one
//! module identifier. Records are immutable once appended; everything else
//! in this module is derived from them at query time.

use serde::{Deserialize, Serialize};

/// Name of the synthetic loader seeded at the head of a transform chain
/// when no plugin load hook produced the module's content.
pub const PLACEHOLDER_LOADER: &str = "__load__";

/// The hook capabilities a plugin may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Rewrites a module identifier to another identifier.
    ResolveId,
    /// Produces a module's initial content.
    Load,
    /// Rewrites a module's content.
    Transform,
}

impl HookKind {
    /// Hook name as the host pipeline spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::ResolveId => "resolveId",
            HookKind::Load => "load",
            HookKind::Transform => "transform",
        }
    }
}

/// One observed hook invocation for one module identifier.
///
/// `start` and `end` are microseconds on the owning context's monotonic
/// clock, with `end >= start`. `result` holds a resolved identifier or
/// produced content; `error` is present iff the call failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookRecord {
    /// Plugin name (not necessarily unique across the pipeline)
    pub name: String,
    /// Outcome: resolved identifier or produced/transformed content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Failure message, present iff the call raised
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Invocation start, microseconds on the context clock
    pub start: u64,
    /// Invocation end, microseconds on the context clock
    pub end: u64,
}

impl HookRecord {
    /// Record for a successful invocation.
    pub fn ok(name: impl Into<String>, start: u64, end: u64, result: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: Some(result.into()),
            error: None,
            start,
            end,
        }
    }

    /// Record for a failed invocation. The failure itself is re-raised by
    /// the interceptor; this only keeps it visible in the chain.
    pub fn failed(name: impl Into<String>, start: u64, end: u64, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: None,
            error: Some(error.into()),
            start,
            end,
        }
    }

    /// Wall time spent in the hook, microseconds.
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// True for the synthetic placeholder-loader record.
    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_LOADER
    }
}

/// Per-module dump form: the fully-resolved identifier plus the raw
/// transform chain, as persisted into the report directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTransformInfo {
    pub resolved_id: String,
    pub transforms: Vec<HookRecord>,
}

/// One plugin's contribution to a module, in chain order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginContribution {
    pub name: String,
    /// Transform-hook duration, microseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<u64>,
    /// Resolve-hook duration, microseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_id: Option<u64>,
}

/// Derived per-module view, assembled on demand and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub id: String,
    /// Dependency identifiers, supplied by the host's module graph
    pub deps: Vec<String>,
    pub plugins: Vec<PluginContribution>,
    /// True when no real on-disk loader produced the content
    #[serde(rename = "virtual")]
    pub virtual_module: bool,
    /// Sum of transform durations only, microseconds
    pub total_time: u64,
    /// Raw transform attempts, including no-ops
    pub invoke_count: u64,
    pub source_size: usize,
    pub dist_size: usize,
}

/// Invocation count and accumulated time for one hook kind of one plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookMetric {
    pub invoke_count: u64,
    /// Microseconds
    pub total_time: u64,
}

impl HookMetric {
    /// Fold one record into the counter.
    pub fn add(&mut self, duration: u64) {
        self.invoke_count += 1;
        self.total_time += duration;
    }
}

/// Derived per-plugin metrics, split by hook kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetricInfo {
    pub name: String,
    /// Declared execution-order tag, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce: Option<String>,
    pub transform: HookMetric,
    pub resolve_id: HookMetric,
}

impl PluginMetricInfo {
    /// Zeroed metrics entry for a plugin.
    pub fn empty(name: impl Into<String>, enforce: Option<String>) -> Self {
        Self {
            name: name.into(),
            enforce,
            transform: HookMetric::default(),
            resolve_id: HookMetric::default(),
        }
    }
}
