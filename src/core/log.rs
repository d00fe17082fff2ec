//! Tracing setup for the binary.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, filter::Targets, fmt, prelude::*};

const APP_TARGET: &str = "fxarchive";

fn levels(verbose: bool) -> (LevelFilter, &'static str) {
    if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    }
}

/// Installs the global subscriber. Logs go to stderr; stdout carries command
/// output. `RUST_LOG` replaces the default directive when set.
pub fn init_logging(verbose: bool) {
    let (app_level, directive) = levels(verbose);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let fmt_layer = fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();

    let installed = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(Targets::new().with_target(APP_TARGET, app_level))
        .with(env_filter)
        .try_init();
    if let Err(e) = installed {
        eprintln!("Logging was already initialised: {e}");
    }
}
