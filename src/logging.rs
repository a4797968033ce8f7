use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LogFormat;

pub const SERVICE_NAME: &str = "play-manager";

/// Filter used by the server when `RUST_LOG` is not set.
pub const SERVER_FILTER: &str = "info,playmgr=debug,reqwest=warn";

/// Filter for one-shot commands; their progress goes to the terminal output
/// instead.
pub const COMMAND_FILTER: &str = "warn";

/// Installs the global subscriber. `RUST_LOG` overrides `default_directives`.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(format: LogFormat, default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init(),
    };

    if result.is_ok() {
        tracing::debug!(service = SERVICE_NAME, ?format, "logging initialised");
    }
}
