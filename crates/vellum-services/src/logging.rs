//! Tracing setup for the embedding host process.
//!
//! Log events from the integrity services are ordinary `tracing` calls; this
//! module wires them to an append-mode file under the data directory. Failing
//! to initialise (or initialising twice) degrades to silence rather than
//! taking down the host; observability stays isolated from control flow.

use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_NAME: &str = "services.log";

/// Initialise the global subscriber with a file writer and env filter.
/// `log_dir` overrides the default data directory (used by tests).
pub fn init(log_dir: Option<&Path>) -> anyhow::Result<()> {
    let dir = match log_dir {
        Some(d) => d.to_path_buf(),
        None => crate::platform::data_dir(),
    };
    std::fs::create_dir_all(&dir)?;
    let log_path = dir.join(LOG_FILE_NAME);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);

    // A second init (host already installed a subscriber) is not an error.
    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,vellum_services=debug")),
        )
        .try_init();

    Ok(())
}
