use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "dfs-gateway.log";

fn filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Logs to stdout and, with a directory, to an hourly rolling file. Keep the
/// returned guard alive for as long as the process logs.
pub fn init_tracing(log_dir: Option<&Path>, verbose: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let (file, guard) = match log_dir {
        Some(dir) => {
            let append = tracing_appender::rolling::hourly(dir, LOG_FILE);
            let (non_blocking, guard) = tracing_appender::non_blocking(append);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(file)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(guard)
}
