//! File logging for the command-line front end.

use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "TILLPOINT_LOG";

const DEFAULT_FILTER: &str = "tillpoint=info";

fn filter() -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a subscriber writing to a daily-rolling file under
/// `<data_dir>/logs/`. Stdout is left to command output.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(data_dir: &Path) -> Result<WorkerGuard> {
  let log_dir = data_dir.join("logs");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create {}: {}", log_dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&log_dir, "tillpoint.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter())
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}
