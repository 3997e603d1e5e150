use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Install a stderr subscriber. `RUST_LOG` directives refine `level`.
pub fn init_logging(level: &str) {
    let (default_level, valid) = match level.parse::<LevelFilter>() {
        Ok(parsed) => (parsed, true),
        Err(_) => (LevelFilter::INFO, false),
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).with_filter(filter))
        .init();

    if !valid {
        tracing::warn!("Invalid log level '{}', defaulting to 'info'", level);
    }
}
