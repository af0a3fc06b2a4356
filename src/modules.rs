//! Module-info assembly
//!
//! Builds the sorted per-module view from a recorder snapshot: which
//! plugins touched each identifier, for how long, and what the module's
//! source and output sizes were. Module info is reported from the
//! perspective of the *resolved* identifier, so the resolve log is inverted
//! (indexed by destination) before the union of identifiers is taken.

use crate::options::{DepsFn, VirtualFn};
use crate::record::{HookKind, HookRecord, ModuleInfo, PluginContribution};
use crate::recorder::Recorder;
use std::collections::{BTreeSet, HashMap};

/// Assemble the sorted module-info list for one variant.
///
/// Deterministic under identical recorder state: identifiers are visited in
/// lexicographic order and chains are already completion-ordered.
pub fn modules_info(
    recorder: &Recorder,
    deps: Option<&DepsFn>,
    is_virtual: Option<&VirtualFn>,
) -> Vec<ModuleInfo> {
    let mut resolved_to: HashMap<String, Vec<HookRecord>> = HashMap::new();
    for (_, records) in recorder.resolve_entries() {
        for rec in records {
            if let Some(result) = rec.result.clone() {
                resolved_to.entry(result).or_default().push(rec);
            }
        }
    }

    let mut ids: BTreeSet<String> = resolved_to.keys().cloned().collect();
    for (id, _) in recorder.transform_entries() {
        ids.insert(id);
    }

    ids.into_iter()
        .map(|id| {
            let chain = recorder.transform_chain(&id).unwrap_or_default();

            let mut plugins = Vec::with_capacity(chain.len());
            let mut total_time = 0u64;
            for rec in &chain {
                let duration = rec.duration();
                total_time += duration;
                plugins.push(PluginContribution {
                    name: rec.name.clone(),
                    transform: Some(duration),
                    resolve_id: None,
                });
            }
            for rec in resolved_to.get(&id).map(Vec::as_slice).unwrap_or_default() {
                plugins.push(PluginContribution {
                    name: rec.name.clone(),
                    transform: None,
                    resolve_id: Some(rec.duration()),
                });
            }

            let virtual_module = match chain.first() {
                None => true,
                Some(first) => {
                    first.is_placeholder()
                        || is_virtual
                            .map(|decide| decide(&first.name, HookKind::Load.as_str()))
                            .unwrap_or(false)
                }
            };

            let source_size = chain
                .first()
                .and_then(|rec| rec.result.as_ref())
                .map_or(0, String::len);
            let dist_size = chain
                .last()
                .and_then(|rec| rec.result.as_ref())
                .map_or(0, String::len);

            ModuleInfo {
                deps: deps.map(|lookup| lookup(&id)).unwrap_or_default(),
                invoke_count: recorder.transform_count(&id),
                id,
                plugins,
                virtual_module,
                total_time,
                source_size,
                dist_size,
            }
        })
        .collect()
}
