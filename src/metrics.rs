//! Per-plugin metric aggregation
//!
//! Folds every recorded invocation into per-plugin counters, split by hook
//! kind. Configured plugins are pre-registered so each appears even with no
//! activity; records from hooks injected outside the declared list create
//! entries on the fly.

use crate::options::PluginDesc;
use crate::record::PluginMetricInfo;
use crate::recorder::Recorder;
use std::collections::HashMap;

/// Aggregate plugin metrics from one variant's recorder.
///
/// Placeholder-loader transform records are instrumentation scaffolding and
/// never count. Output is sorted by plugin name.
pub fn plugin_metrics(recorder: &Recorder, plugins: &[PluginDesc]) -> Vec<PluginMetricInfo> {
    let mut map: HashMap<String, PluginMetricInfo> = HashMap::new();

    for desc in plugins {
        map.insert(
            desc.name.clone(),
            PluginMetricInfo::empty(desc.name.as_str(), desc.order.map(|order| order.to_string())),
        );
    }

    for (_, chain) in recorder.transform_entries() {
        for rec in &chain {
            if rec.is_placeholder() {
                continue;
            }
            map.entry(rec.name.clone())
                .or_insert_with(|| PluginMetricInfo::empty(rec.name.as_str(), None))
                .transform
                .add(rec.duration());
        }
    }

    for (_, records) in recorder.resolve_entries() {
        for rec in &records {
            map.entry(rec.name.clone())
                .or_insert_with(|| PluginMetricInfo::empty(rec.name.as_str(), None))
                .resolve_id
                .add(rec.duration());
        }
    }

    let mut metrics: Vec<PluginMetricInfo> = map.into_values().collect();
    metrics.sort_by(|a, b| a.name.cmp(&b.name));
    metrics
}
