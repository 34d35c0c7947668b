//! Platform-specific paths
//!
//! - Settings directory (per-user config dir)
//! - yt-dlp executable discovery

use std::path::{Path, PathBuf};
use tracing::debug;

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/vidfetch
/// - Windows: %APPDATA%\vidfetch
/// - Linux: ~/.config/vidfetch
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidfetch")
}

/// Default settings file location
pub fn settings_file() -> PathBuf {
    config_dir().join("config.json")
}

/// Platform-specific yt-dlp binary name
pub fn ytdlp_binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else {
        "yt-dlp"
    }
}

/// Find yt-dlp with priority:
/// 1. Next to the vidfetch executable
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(adjacent) = find_adjacent() {
        debug!("Using yt-dlp next to executable: {}", adjacent.display());
        return Some(adjacent);
    }

    if let Ok(path) = which::which(ytdlp_binary_name()) {
        debug!("Using yt-dlp from PATH: {}", path.display());
        return Some(path);
    }

    if let Some(common) = find_in_common_paths() {
        debug!("Using yt-dlp from common path: {}", common.display());
        return Some(common);
    }

    debug!("yt-dlp not found in PATH or common locations");
    None
}

fn find_adjacent() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let candidate = exe_path.parent()?.join(ytdlp_binary_name());
    is_executable(&candidate).then_some(candidate)
}

fn find_in_common_paths() -> Option<PathBuf> {
    let mut candidates = vec![
        // macOS Homebrew (Apple Silicon)
        PathBuf::from("/opt/homebrew/bin/yt-dlp"),
        // macOS Homebrew (Intel) / manual installs
        PathBuf::from("/usr/local/bin/yt-dlp"),
        PathBuf::from("/usr/bin/yt-dlp"),
    ];
    // pip --user
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("yt-dlp"));
    }

    candidates.into_iter().find(|path| is_executable(path))
}

/// Check if a file is executable
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        match std::fs::metadata(path) {
            Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
