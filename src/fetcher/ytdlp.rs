//! yt-dlp backend
//!
//! Runs yt-dlp as a child process per target. Progress is requested as one
//! JSON object per line through `--progress-template`, so nothing here has to
//! scrape yt-dlp's human-readable progress output.

use crate::fetcher::models::{FetchOptions, ProgressEvent, RawProgress, SubtitleSelection};
use crate::fetcher::traits::MediaFetcher;
use crate::utils::error::VidfetchError;
use crate::utils::platform;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as AsyncCommand;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Marker prepended to every progress line we ask yt-dlp to print
pub const PROGRESS_PREFIX: &str = "vidfetch-progress:";

/// Stderr lines kept to explain a failure when yt-dlp printed no `ERROR:` line
const STDERR_TAIL: usize = 5;

/// Media fetcher backed by the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    ytdlp_path: PathBuf,
}

impl YtDlpFetcher {
    /// Use an explicit yt-dlp executable
    pub fn with_path(ytdlp_path: impl Into<PathBuf>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }

    /// Locate yt-dlp, failing if it cannot be found
    pub fn new() -> Result<Self> {
        match platform::find_ytdlp() {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                Ok(Self::with_path(path))
            }
            None => Err(VidfetchError::YtDlpNotFound.into()),
        }
    }

    /// Locate yt-dlp, preferring `explicit`.
    ///
    /// When nothing is found the bare command name is used so that each
    /// download fails (and is retried and logged) instead of the whole run.
    pub fn locate(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            if !platform::is_executable(path) {
                warn!("Configured yt-dlp {} is not an executable file", path.display());
            }
            return Self::with_path(path);
        }

        Self::new().unwrap_or_else(|e| {
            warn!("{}. Downloads will fail until it is installed:", e);
            warn!("  pip install yt-dlp  (or see https://github.com/yt-dlp/yt-dlp)");
            Self::with_path(platform::ytdlp_binary_name())
        })
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }
}

/// Build the yt-dlp argument list for one target
pub fn build_args(target: &str, options: &FetchOptions) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--newline".into(),
        "--progress".into(),
        "--no-warnings".into(),
        "--progress-template".into(),
        format!("download:{}%(progress)j", PROGRESS_PREFIX),
        "-o".into(),
        options.output_template.clone(),
        "-f".into(),
        options.format.clone(),
        "--merge-output-format".into(),
        options.merge_output_format.clone(),
    ];

    match &options.subtitles {
        None => {}
        Some(SubtitleSelection::All) => {
            args.extend(["--write-subs".into(), "--sub-langs".into(), "all".into()]);
        }
        Some(SubtitleSelection::Languages(langs)) => {
            args.extend([
                "--write-subs".into(),
                "--sub-langs".into(),
                langs.join(","),
            ]);
        }
    }

    // End of options: a target starting with '-' must not be read as a flag
    args.push("--".into());
    args.push(target.to_string());
    args
}

/// Parse one output line into a progress event, if it is one of ours
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let start = line.find(PROGRESS_PREFIX)?;
    let json = &line[start + PROGRESS_PREFIX.len()..];
    match serde_json::from_str::<RawProgress>(json.trim()) {
        Ok(raw) => Some(raw.into()),
        Err(e) => {
            debug!("Unparseable progress line ({}): {}", e, line);
            None
        }
    }
}

/// Forward progress lines, keep everything else for diagnostics
fn spawn_line_reader<R>(
    stream: R,
    progress_tx: mpsc::Sender<ProgressEvent>,
    stream_name: &'static str,
) -> JoinHandle<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        let mut other = Vec::new();

        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(event) = parse_progress_line(&line) {
                // Best-effort: the reporter may already be gone
                let _ = progress_tx.send(event).await;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            debug!("[yt-dlp {}] {}", stream_name, line);
            other.push(line);
        }

        other
    })
}

/// Pick the most useful explanation out of yt-dlp's stderr
fn failure_message(stderr_lines: &[String]) -> String {
    if let Some(error_line) = stderr_lines.iter().rev().find(|l| l.contains("ERROR:")) {
        return error_line.trim().to_string();
    }
    let start = stderr_lines.len().saturating_sub(STDERR_TAIL);
    let tail = stderr_lines[start..].join(" | ");
    if tail.is_empty() {
        "yt-dlp download failed".to_string()
    } else {
        tail
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(
        &self,
        target: &str,
        options: &FetchOptions,
        progress_tx: mpsc::Sender<ProgressEvent>,
    ) -> Result<()> {
        let args = build_args(target, options);
        debug!("Running {} {:?}", self.ytdlp_path.display(), args);

        let mut child = AsyncCommand::new(&self.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(VidfetchError::Spawn)?;

        let stdout_reader = child
            .stdout
            .take()
            .map(|out| spawn_line_reader(out, progress_tx.clone(), "stdout"));
        let stderr_reader = child
            .stderr
            .take()
            .map(|err| spawn_line_reader(err, progress_tx.clone(), "stderr"));
        drop(progress_tx);

        let status = child.wait().await?;

        if let Some(handle) = stdout_reader {
            let _ = handle.await;
        }
        let stderr_lines = match stderr_reader {
            Some(handle) => handle.await.unwrap_or_default(),
            None => Vec::new(),
        };

        if status.success() {
            Ok(())
        } else {
            Err(VidfetchError::FetchFailed {
                code: status.code(),
                message: failure_message(&stderr_lines),
            }
            .into())
        }
    }
}
