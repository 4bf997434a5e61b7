//! Diagnostic logging for the CLI.
//!
//! Logs go to stderr so reports on stdout stay machine-readable.
//! `RUST_LOG` takes precedence over the `--verbose` flag:
//! ```bash
//! RUST_LOG=luablocks_core=trace luablocks extract src/
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Install the global subscriber. Call once at startup.
///
/// Quiet by default (`warn`); `verbose` raises the default to `debug`.
pub fn init(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .with_level(true)
        .with_filter(filter);

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
