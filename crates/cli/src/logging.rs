//! Logger setup: `log` records from every crate go to stderr and to the
//! configured log file.

use std::fs::OpenOptions;
use std::sync::Mutex;

use reconmap_config::Settings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Overrides the level derived from settings, e.g. `RECONMAP_LOG=reconmap_io=debug`.
pub const LOG_ENV: &str = "RECONMAP_LOG";

pub fn init(settings: &Settings) -> Result<(), String> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::try_new(settings.effective_log_level()).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file_path)
        .map_err(|e| format!("cannot open log file {}: {e}", settings.log_file_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|e| format!("failed to initialize logger: {e}"))
}
