//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Picks the default level from the global flags.
pub fn default_level(quiet: bool, verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::INFO
    }
}

/// Installs a stderr subscriber. `RUST_LOG`, when set, wins over the flags.
pub fn init(quiet: bool, verbose: bool) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => EnvFilter::default().add_directive(default_level(quiet, verbose).into()),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    });
}
