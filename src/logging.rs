//! Logging setup.
//!
//! All crate logging goes through `tracing`; this module only installs the
//! subscriber. The filter comes from `RUST_LOG` when set, otherwise
//! `sluice=info` (or `sluice=warn` when quiet).

use tracing_subscriber::EnvFilter;

pub fn init(quiet: bool) {
    let default = if quiet { "sluice=warn" } else { "sluice=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed by the embedding program or a test.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
