//! Inspection context: recorders, identifier resolution, and queries
//!
//! One context owns the monotonic clock, the per-variant recorders, and the
//! update debouncer, and answers every consumer-facing query over them.

use crate::entries::EntriesList;
use crate::error::InspectError;
use crate::metrics;
use crate::modules;
use crate::notify::UpdateDebouncer;
use crate::options::InspectOptions;
use crate::record::{ModuleInfo, ModuleTransformInfo, PluginMetricInfo};
use crate::recorder::{BuildVariant, Recorder};
use std::sync::Arc;
use std::time::Instant;

/// Resolve chains longer than this are treated as cycles.
const MAX_RESOLVE_DEPTH: usize = 64;

pub struct InspectContext {
    options: InspectOptions,
    origin: Instant,
    recorder_client: Recorder,
    recorder_ssr: Recorder,
    notifier: UpdateDebouncer,
}

impl InspectContext {
    pub fn new(options: InspectOptions) -> Arc<Self> {
        let notifier = UpdateDebouncer::new(options.debounce_window);
        Arc::new(Self {
            options,
            origin: Instant::now(),
            recorder_client: Recorder::new(),
            recorder_ssr: Recorder::new(),
            notifier,
        })
    }

    pub fn options(&self) -> &InspectOptions {
        &self.options
    }

    /// Microseconds on the context's monotonic clock.
    pub fn now(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    /// The recorder for a build variant.
    pub fn recorder(&self, variant: BuildVariant) -> &Recorder {
        match variant {
            BuildVariant::Client => &self.recorder_client,
            BuildVariant::Ssr => &self.recorder_ssr,
        }
    }

    /// Follow the recorded redirections of `id` to its final identifier.
    ///
    /// A relative `./` identifier is first normalized against the project
    /// root. A chain running past the depth bound is a host-pipeline cycle:
    /// it logs a warning and falls back to the unresolved identifier.
    pub fn resolve_id(&self, id: &str, variant: BuildVariant) -> String {
        let id = self.normalize_id(id);
        match self.resolve_id_bounded(&id, variant) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(%id, %err, "falling back to unresolved identifier");
                id
            }
        }
    }

    fn resolve_id_bounded(
        &self,
        id: &str,
        variant: BuildVariant,
    ) -> Result<String, InspectError> {
        let recorder = self.recorder(variant);
        let mut current = id.to_string();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match recorder.last_resolve_result(&current) {
                Some(next) => current = next,
                None => return Ok(current),
            }
        }
        Err(InspectError::ResolveDepthExceeded {
            id: id.to_string(),
            limit: MAX_RESOLVE_DEPTH,
        })
    }

    fn normalize_id(&self, id: &str) -> String {
        match id.strip_prefix("./") {
            Some(rest) => format!("{}/{}", self.options.root.trim_end_matches('/'), rest),
            None => id.to_string(),
        }
    }

    /// Project root plus the derived entry list.
    pub fn list(&self) -> EntriesList {
        EntriesList {
            root: self.options.root.clone(),
            entries: self.options.entries.entries(),
        }
    }

    /// Sorted per-plugin metrics for one variant.
    pub fn plugin_metrics(&self, variant: BuildVariant) -> Vec<PluginMetricInfo> {
        metrics::plugin_metrics(self.recorder(variant), &self.options.plugins)
    }

    /// Sorted module-info list for one variant.
    pub fn modules_info(&self, variant: BuildVariant) -> Vec<ModuleInfo> {
        modules::modules_info(
            self.recorder(variant),
            self.options.deps.as_ref(),
            self.options.is_virtual.as_ref(),
        )
    }

    /// Dump one identifier's resolved form and raw transform chain.
    pub fn module_dump(&self, id: &str, variant: BuildVariant) -> Option<ModuleTransformInfo> {
        self.recorder(variant)
            .transform_chain(id)
            .map(|transforms| ModuleTransformInfo {
                resolved_id: self.resolve_id(id, variant),
                transforms,
            })
    }

    /// Dump every identifier with transform activity, identifier-sorted.
    pub fn dump_all(&self, variant: BuildVariant) -> Vec<(String, ModuleTransformInfo)> {
        let mut entries: Vec<(String, ModuleTransformInfo)> = self
            .recorder(variant)
            .transform_entries()
            .into_iter()
            .map(|(id, transforms)| {
                let info = ModuleTransformInfo {
                    resolved_id: self.resolve_id(&id, variant),
                    transforms,
                };
                (id, info)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Host-reported module changes; collapses into one staleness signal
    /// per quiescent window.
    pub fn module_updated(&self, ids: &[String]) {
        tracing::debug!(count = ids.len(), "module identifiers changed");
        self.notifier.signal();
    }

    /// The staleness-signal debouncer, for observers to subscribe to.
    pub fn notifier(&self) -> &UpdateDebouncer {
        &self.notifier
    }
}
