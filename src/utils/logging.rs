//! Logging setup: console on stderr plus a plain-text log file

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter for a given `-v` count; `RUST_LOG` takes precedence
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "vidfetch=info",
        1 => "vidfetch=debug",
        _ => "vidfetch=trace",
    }
}

/// Split a log file path into the directory and file name the appender needs
fn split_log_path(log_file: &Path) -> (PathBuf, String) {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = log_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "vidfetch.log".to_string());
    (dir, name)
}

/// Initialize tracing.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. When the log file cannot be opened only the
/// console layer is installed and `None` is returned.
pub fn init_tracing(log_file: &Path, verbosity: u8) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let file_appender = match open_log_file(log_file) {
        Ok(appender) => appender,
        Err(message) => {
            eprintln!("Failed to open log file {}: {}", log_file.display(), message);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init();
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file = fmt::layer().with_writer(non_blocking).with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
    Some(guard)
}

/// Append-only appender for `log_file`, creating its directory first
fn open_log_file(log_file: &Path) -> Result<RollingFileAppender, String> {
    let (dir, name) = split_log_path(log_file);
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(&dir)
        .map_err(|e| e.to_string())
}
