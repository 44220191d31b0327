use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "REEL_LOG";
const LOG_FILE: &str = "reel.log";

/// `REEL_LOG` if set and valid, otherwise `info`.
fn env_filter() -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Send logs to `<dir>/reel.log`; the terminal belongs to the TUI.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;
  let appender = RollingFileAppender::builder()
    .rotation(Rotation::NEVER)
    .filename_prefix(LOG_FILE)
    .build(dir)
    .with_context(|| format!("Failed to open {}", dir.join(LOG_FILE).display()))?;
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(env_filter())
    .with(fmt::layer().with_target(true).with_ansi(false).with_writer(writer))
    .try_init()
    .context("Failed to install tracing subscriber")?;

  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_filter_is_info() {
    // Only meaningful when the variable isn't set by the test environment.
    if std::env::var(LOG_ENV).is_err() {
      assert_eq!(env_filter().to_string(), "info");
    }
  }
}
