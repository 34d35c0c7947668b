//! Data structures exchanged with the fetch backend

use serde::Deserialize;

/// Which subtitles to request alongside the media
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleSelection {
    /// Every language the site offers
    All,
    /// Only these language codes
    Languages(Vec<String>),
}

/// Options handed to the fetch backend for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Output path template, e.g. `/tmp/out/%(title)s.%(ext)s`
    pub output_template: String,
    /// Opaque format selector
    pub format: String,
    /// Container the selected streams are merged into
    pub merge_output_format: String,
    /// `None` when subtitles are not wanted
    pub subtitles: Option<SubtitleSelection>,
}

/// Progress report emitted by the fetch backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Downloading {
        filename: String,
        downloaded_bytes: u64,
        /// Exact total if known, else the backend's estimate
        total_bytes: Option<u64>,
    },
    Finished {
        filename: String,
    },
    /// Any other status (`error`, `processing`, ...)
    Other {
        status: String,
    },
}

/// Progress dictionary as printed by `%(progress)j`.
///
/// yt-dlp reports estimates as floats, so every counter is read as `f64`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawProgress {
    pub status: String,
    pub filename: Option<String>,
    pub downloaded_bytes: Option<f64>,
    pub total_bytes: Option<f64>,
    pub total_bytes_estimate: Option<f64>,
}

fn positive_bytes(value: Option<f64>) -> Option<u64> {
    value.filter(|v| v.is_finite() && *v > 0.0).map(|v| v as u64)
}

impl From<RawProgress> for ProgressEvent {
    fn from(raw: RawProgress) -> Self {
        let filename = raw.filename.unwrap_or_default();
        match raw.status.as_str() {
            "downloading" => ProgressEvent::Downloading {
                filename,
                downloaded_bytes: positive_bytes(raw.downloaded_bytes).unwrap_or(0),
                total_bytes: positive_bytes(raw.total_bytes)
                    .or_else(|| positive_bytes(raw.total_bytes_estimate)),
            },
            "finished" => ProgressEvent::Finished { filename },
            _ => ProgressEvent::Other { status: raw.status },
        }
    }
}
