use tracing_subscriber::{fmt, EnvFilter};

/// Initialise stderr logging.
///
/// `RUST_LOG` overrides the level (e.g. `RUST_LOG=kpi_insight_core=debug`).
/// The default is `warn` so stdout stays clean for piping JSON/CSV.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(false)
        .try_init();
}
