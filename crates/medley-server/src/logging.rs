//! Tracing subscriber setup.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber once. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                EnvFilter::new("debug,hyper=warn,hyper_util=warn,reqwest=warn")
            } else {
                EnvFilter::new("info,hyper=warn,hyper_util=warn,reqwest=warn")
            }
        });
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .ok();
    });
}
