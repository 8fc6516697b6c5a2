//! Logging setup
//!
//! Logs go to stderr so they never interleave with the interactive prompts.

use tracing_subscriber::EnvFilter;

/// Map `-v` occurrences to a default filter
fn default_filter(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "warn",
        1 => "popcorn=debug,warn",
        _ => "trace",
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose_level: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose_level)));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
