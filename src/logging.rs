use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber (stderr, `RUST_LOG`-driven).
///
/// `quiet` lowers the default level when `RUST_LOG` is unset. Calling this twice
/// is harmless: the second install attempt is ignored.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { "lagplot=warn" } else { "lagplot=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
