//! Command implementations for runconf-cli

pub mod inspect;
pub mod show;

pub use inspect::{run_env_map, run_keys};
pub use show::run_show;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::error::{CliError, Result};

/// Install the process-wide subscriber
///
/// Verbose mode logs everything at DEBUG; otherwise `RUST_LOG` decides,
/// defaulting to warnings only.
pub fn init_logging(verbose: bool) -> Result<()> {
    if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
        tracing::debug!("Verbose mode enabled");
        Ok(())
    } else {
        runconf_core::logging::init("warn")
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))
    }
}
