//! Process-wide diagnostic logging
//!
//! Explicit one-shot initialization at startup; no runtime
//! reconfiguration. Library code only emits through `tracing` macros, so a
//! host that installs its own subscriber first wins.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the stderr subscriber, filtered by `RUST_LOG`. Safe to call more
/// than once; later calls and host-installed subscribers are respected.
pub fn init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    });
}
