use std::io;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. Logs go to stderr so stdout only carries
/// diagnostics and exported data.
///
/// The level comes from `RUST_LOG` and defaults to "warn".
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.init();
    }
}
