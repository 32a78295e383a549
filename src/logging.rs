//! Diagnostic logging.
//!
//! Installs a `tracing` fmt subscriber on stderr. `RUST_LOG` wins over the
//! `[logging].filter` value from the config file. Request failures are
//! logged at `warn` with the query that caused them; superseded and
//! cancelled loads at `debug`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
