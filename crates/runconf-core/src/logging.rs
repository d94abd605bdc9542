use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a compact tracing subscriber for a host process.
///
/// The level comes from `RUST_LOG`, falling back to `default_level`
/// (for example `"warn"` or `"runconf=debug"`).
pub fn init(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
