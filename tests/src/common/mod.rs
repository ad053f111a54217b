//! Shared fixtures: the simulated platform that plays the external node
//! software for every scenario.


pub use platform::SimulatedPlatform;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install the fmt subscriber once per test binary. `RUST_LOG` overrides
/// the default `debug` filter.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
