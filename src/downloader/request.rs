//! What to download and where

use crate::fetcher::{FetchOptions, SubtitleSelection};
use std::path::PathBuf;

/// Kind of target behind a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Video,
    Playlist,
}

impl TargetKind {
    /// Word used in log lines and notifications
    pub fn noun(&self) -> &'static str {
        match self {
            TargetKind::Video => "video",
            TargetKind::Playlist => "playlist",
        }
    }
}

/// Subtitle request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleOptions {
    pub enabled: bool,
    /// `None` (or empty) means every available language
    pub languages: Option<Vec<String>>,
}

impl SubtitleOptions {
    pub fn selection(&self) -> Option<SubtitleSelection> {
        if !self.enabled {
            return None;
        }
        match &self.languages {
            Some(langs) if !langs.is_empty() => Some(SubtitleSelection::Languages(langs.clone())),
            _ => Some(SubtitleSelection::All),
        }
    }
}

/// Options shared by every target of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub output_dir: PathBuf,
    pub format: String,
    pub subtitles: SubtitleOptions,
}

/// One download: a target plus the options it runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub target: String,
    pub kind: TargetKind,
    pub options: DownloadOptions,
}

impl DownloadRequest {
    pub fn video(target: impl Into<String>, options: DownloadOptions) -> Self {
        Self {
            target: target.into(),
            kind: TargetKind::Video,
            options,
        }
    }

    pub fn playlist(target: impl Into<String>, options: DownloadOptions) -> Self {
        Self {
            target: target.into(),
            kind: TargetKind::Playlist,
            options,
        }
    }

    /// yt-dlp output template: flat for videos, one directory per playlist
    pub fn output_template(&self) -> String {
        let relative = match self.kind {
            TargetKind::Video => PathBuf::from("%(title)s.%(ext)s"),
            TargetKind::Playlist => PathBuf::from("%(playlist)s").join("%(title)s.%(ext)s"),
        };
        self.options
            .output_dir
            .join(relative)
            .to_string_lossy()
            .into_owned()
    }

    /// Options structure handed to the fetch backend
    pub fn fetch_options(&self, merge_output_format: &str) -> FetchOptions {
        FetchOptions {
            output_template: self.output_template(),
            format: self.options.format.clone(),
            merge_output_format: merge_output_format.to_string(),
            subtitles: self.options.subtitles.selection(),
        }
    }
}
