//! Command-line arguments and how they combine with the settings file

use crate::downloader::{DownloadOptions, RetryPolicy, SubtitleOptions};
use crate::utils::AppSettings;
use clap::Parser;
use path_absolutize::Absolutize;
use std::path::PathBuf;

/// Download videos, playlists, or batches of videos with yt-dlp
#[derive(Parser, Debug, Default)]
#[command(name = "vidfetch", version)]
pub struct Args {
    /// URL of a single video to download
    #[arg(long, value_name = "URL")]
    pub video: Option<String>,

    /// URL of a playlist to download
    #[arg(long, value_name = "URL")]
    pub playlist: Option<String>,

    /// URLs of several videos to download concurrently
    #[arg(long, value_name = "URL", num_args = 1..)]
    pub multiple: Vec<String>,

    /// Output directory [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// yt-dlp format selector [default: bestvideo+bestaudio/best]
    #[arg(short, long, value_name = "SELECTOR")]
    pub format: Option<String>,

    /// Download subtitles
    #[arg(long)]
    pub subtitles: bool,

    /// Subtitle languages (all available when omitted)
    #[arg(long, value_name = "LANG", num_args = 1..)]
    pub subtitle_langs: Vec<String>,

    /// Total attempts per download [default: 3]
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Seconds to wait between attempts [default: 5]
    #[arg(long, value_name = "SECS")]
    pub retry_delay: Option<u64>,

    /// Concurrent downloads for --multiple [default: 5]
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Do not send desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp", value_name = "PATH")]
    pub ytdlp: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file [default: vidfetch.log]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Download mode, picked by flag presence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Video(String),
    Playlist(String),
    Multiple(Vec<String>),
}

impl Args {
    /// First present mode in priority order: video, playlist, multiple
    pub fn mode(&self) -> Option<Mode> {
        if let Some(url) = &self.video {
            return Some(Mode::Video(url.clone()));
        }
        if let Some(url) = &self.playlist {
            return Some(Mode::Playlist(url.clone()));
        }
        if !self.multiple.is_empty() {
            return Some(Mode::Multiple(self.multiple.clone()));
        }
        None
    }

    /// Settings with every given flag applied on top
    pub fn apply_to(&self, mut settings: AppSettings) -> AppSettings {
        if let Some(output) = &self.output {
            settings.output_dir = output.clone();
        }
        if let Some(format) = &self.format {
            settings.format = format.clone();
        }
        if let Some(retries) = self.retries {
            settings.retry_attempts = retries;
        }
        if let Some(delay) = self.retry_delay {
            settings.retry_delay_secs = delay;
        }
        if let Some(workers) = self.workers {
            settings.max_concurrent = workers;
        }
        if self.no_notify {
            settings.notifications = false;
        }
        if let Some(path) = &self.ytdlp {
            settings.ytdlp_path = Some(path.clone());
        }
        if let Some(path) = &self.log_file {
            settings.log_file = path.clone();
        }
        settings.sanitize();
        settings
    }

    /// Options shared by every target of this run
    pub fn download_options(&self, settings: &AppSettings) -> DownloadOptions {
        let output_dir = settings
            .output_dir
            .absolutize()
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| settings.output_dir.clone());

        DownloadOptions {
            output_dir,
            format: settings.format.clone(),
            subtitles: SubtitleOptions {
                enabled: self.subtitles,
                languages: if self.subtitle_langs.is_empty() {
                    None
                } else {
                    Some(self.subtitle_langs.clone())
                },
            },
        }
    }
}

/// Retry policy from settings
pub fn retry_policy(settings: &AppSettings) -> RetryPolicy {
    RetryPolicy::new(settings.retry_attempts, settings.retry_delay())
}
