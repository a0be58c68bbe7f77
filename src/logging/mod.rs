//! Application logging functionality
//!
//! Logs always go to stderr. Once `~/.config/scrawl` exists (see
//! `--new-config`), a daily rolling copy is also written to its logs/
//! directory.

use crate::core::config_file::ConfigFile;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Prefix of the daily log files; the appender adds `.YYYY-MM-DD`
const LOG_FILE_PREFIX: &str = "scrawl.log";

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    ConfigFile::logs_dir()
}

/// Get the path to the current log file
pub fn current_log_file() -> PathBuf {
    let date = chrono::Utc::now().format("%Y-%m-%d");
    logs_dir().join(format!("{LOG_FILE_PREFIX}.{date}"))
}

/// Filter from RUST_LOG, falling back to `info`
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// The returned guard flushes the log file when dropped; keep it alive
/// for the life of the process. `None` means no file logging.
pub fn init_logging() -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match file_writer() {
        Some((writer, guard)) => {
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        // A subscriber is already installed (tests, embedding)
        return None;
    }

    if guard.is_some() {
        tracing::info!(
            "=== scrawl started at {} ===",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        tracing::debug!("Logging to {:?}", current_log_file());
    }
    guard
}

fn file_writer() -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    // No config directory means the user never opted into file logs
    if !ConfigFile::config_dir().exists() {
        return None;
    }
    let logs_dir = logs_dir();
    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Failed to create logs directory {:?}: {}", logs_dir, e);
        return None;
    }
    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}
