use anyhow::{Context, Result};
use tabsage_infrastructure::TabSagePaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter variable; defaults to `info`.
const LOG_ENV: &str = "TABSAGE_LOG";

/// Installs stderr logging, plus a daily log file when `to_file` is set.
///
/// Keep the returned guard alive until exit so buffered file lines flush.
pub fn init(paths: &TabSagePaths, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if !to_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr)
            .try_init()
            .context("failed to install logger")?;
        return Ok(None);
    }

    let logs_dir = paths.logs_dir();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("failed to create {}", logs_dir.display()))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&logs_dir, "tabsage.log"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("failed to install logger")?;

    tracing::debug!("[Logging] writing to {}", logs_dir.display());
    Ok(Some(guard))
}
