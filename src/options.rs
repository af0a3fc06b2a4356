//! Host-facing configuration
//!
//! Everything the crate consumes from the host pipeline lands here once,
//! at startup: the project root, the entry specification, the declared
//! plugin list, and the optional module-graph callbacks.

use crate::entries::EntrySpec;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Dependency lookup supplied by the host's module graph.
pub type DepsFn = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Host predicate deciding whether a (plugin name, hook name) pair marks a
/// module as virtual.
pub type VirtualFn = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Declared execution-order tag of a plugin or a single hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PluginOrder {
    Pre,
    #[default]
    Normal,
    Post,
}

impl fmt::Display for PluginOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            PluginOrder::Pre => "pre",
            PluginOrder::Normal => "normal",
            PluginOrder::Post => "post",
        };
        f.write_str(tag)
    }
}

/// One plugin as declared by the host, for metric pre-registration.
#[derive(Debug, Clone)]
pub struct PluginDesc {
    pub name: String,
    pub order: Option<PluginOrder>,
}

impl PluginDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: None,
        }
    }

    pub fn with_order(mut self, order: PluginOrder) -> Self {
        self.order = Some(order);
        self
    }
}

/// Configuration consumed from the host pipeline.
#[derive(Clone)]
pub struct InspectOptions {
    /// Project root; relative identifiers resolve against it
    pub root: String,
    /// Target directory for the finalized report
    pub output_dir: PathBuf,
    /// Static viewer bundle copied next to the report, if any
    pub viewer_dir: Option<PathBuf>,
    /// Configured entry specification, classified once
    pub entries: EntrySpec,
    /// Declared plugin list; each appears in metrics even with no activity
    pub plugins: Vec<PluginDesc>,
    /// Quiescence window for the module-update debouncer
    pub debounce_window: Duration,
    pub deps: Option<DepsFn>,
    pub is_virtual: Option<VirtualFn>,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            output_dir: PathBuf::from(".mirador"),
            viewer_dir: None,
            entries: EntrySpec::Absent,
            plugins: Vec::new(),
            debounce_window: Duration::from_millis(100),
            deps: None,
            is_virtual: None,
        }
    }
}

impl InspectOptions {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_entries(mut self, entries: EntrySpec) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_plugins(mut self, plugins: Vec<PluginDesc>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_viewer_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.viewer_dir = Some(dir.into());
        self
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_deps(mut self, deps: DepsFn) -> Self {
        self.deps = Some(deps);
        self
    }

    pub fn with_virtual_predicate(mut self, is_virtual: VirtualFn) -> Self {
        self.is_virtual = Some(is_virtual);
        self
    }
}

impl fmt::Debug for InspectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InspectOptions")
            .field("root", &self.root)
            .field("output_dir", &self.output_dir)
            .field("viewer_dir", &self.viewer_dir)
            .field("entries", &self.entries)
            .field("plugins", &self.plugins)
            .field("debounce_window", &self.debounce_window)
            .field("deps", &self.deps.as_ref().map(|_| "<fn>"))
            .field("is_virtual", &self.is_virtual.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
