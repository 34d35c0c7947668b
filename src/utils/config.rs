//! Application configuration

use crate::batch::DEFAULT_WORKERS;
use crate::utils::error::VidfetchError;
use crate::utils::platform;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default yt-dlp format selector: best video and best audio merged, else best single file
pub const DEFAULT_FORMAT: &str = "bestvideo+bestaudio/best";

/// Application settings
///
/// Every field is optional in the settings file; missing fields take the
/// defaults below. Command-line flags override whatever is loaded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Download location
    pub output_dir: PathBuf,

    /// yt-dlp format selector
    pub format: String,

    /// Container the fetched streams are merged into
    pub merge_output_format: String,

    /// Total attempts per download
    pub retry_attempts: u32,

    /// Fixed pause between attempts (seconds)
    pub retry_delay_secs: u64,

    /// Maximum concurrent downloads in batch mode
    pub max_concurrent: usize,

    /// Send desktop notifications
    pub notifications: bool,

    /// Explicit yt-dlp executable
    pub ytdlp_path: Option<PathBuf>,

    /// Log file location
    pub log_file: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: DEFAULT_FORMAT.to_string(),
            merge_output_format: "mp4".to_string(),
            retry_attempts: 3,
            retry_delay_secs: 5,
            max_concurrent: DEFAULT_WORKERS,
            notifications: true,
            ytdlp_path: None,
            log_file: PathBuf::from("vidfetch.log"),
        }
    }
}

impl AppSettings {
    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the per-user settings file is
    /// read when present and the defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = platform::settings_file();
                if path.is_file() {
                    Self::from_file(&path)
                } else {
                    debug!("No settings file at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VidfetchError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut settings: AppSettings =
            serde_json::from_str(&content).map_err(|e| VidfetchError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        settings.sanitize();

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Delay between retry attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Enforce sane minimums
    pub fn sanitize(&mut self) {
        if self.max_concurrent == 0 {
            self.max_concurrent = 1;
        }
        if self.retry_attempts == 0 {
            self.retry_attempts = 1;
        }
        if self.format.trim().is_empty() {
            self.format = DEFAULT_FORMAT.to_string();
        }
    }
}
