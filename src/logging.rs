use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the level filter for the given mode.
fn env_filter(debug_mode: bool) -> EnvFilter {
    if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Setup console logging with an optional rotating file appender.
///
/// Console output goes to stderr so stdout carries only the run report.
/// When `log_dir` is given, logs are also written there with daily rotation.
///
/// # Arguments
/// * `log_dir` - Directory for log files, or `None` for console only
/// * `log_prefix` - Prefix for log files (e.g., "binshift")
/// * `debug_mode` - If true, use debug level; otherwise use info level
///
/// # Returns
/// A guard that must be held for the duration of the program to keep file
/// logging active (`None` without a log directory)
pub fn setup_logging(
    log_dir: Option<&Utf8Path>,
    log_prefix: &str,
    debug_mode: bool,
) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .boxed();

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![console_layer];
    let mut guard = None;

    if let Some(log_dir) = log_dir {
        let (file_layer, file_guard) = file_layer(log_dir, log_prefix)?;
        layers.push(file_layer);
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter(debug_mode))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        "Logging initialized: dir={:?}, prefix={}, debug={}",
        log_dir,
        log_prefix,
        debug_mode
    );

    Ok(guard)
}

/// Create the log directory and a daily rotating, ANSI-free file layer.
fn file_layer(
    log_dir: &Utf8Path,
    log_prefix: &str,
) -> Result<(Box<dyn Layer<Registry> + Send + Sync>, WorkerGuard)> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_appender = rolling::daily(log_dir, log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .boxed();

    Ok((layer, guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_file_layer_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = Utf8PathBuf::try_from(temp_dir.path().join("logs")).unwrap();

        // Only build the layer, to avoid global subscriber conflicts in tests
        let (_layer, _guard) = file_layer(&log_dir, "test").unwrap();

        assert!(log_dir.exists());
    }
}
