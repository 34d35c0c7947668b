//! Error handling for vidfetch

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vidfetch
#[derive(Debug, Error)]
pub enum VidfetchError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Failed to start yt-dlp: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("yt-dlp exited with {}: {message}", exit_label(.code))]
    FetchFailed { code: Option<i32>, message: String },

    #[error("Invalid settings file {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}
