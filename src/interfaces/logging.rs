use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt};

/// Sends `tracing` output to stderr, leaving stdout to the progress lines.
///
/// `RUST_LOG` wins over `--verbosity` when it is set.
pub fn init_logging(default_level: LevelFilter) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
