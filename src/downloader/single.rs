//! Download of a single video or playlist target

use crate::downloader::progress::{ProgressDisplay, ProgressReporter};
use crate::downloader::request::{DownloadOptions, DownloadRequest, TargetKind};
use crate::fetcher::{MediaFetcher, ProgressEvent};
use crate::notifier::Notifier;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Capacity of the per-download progress channel
const PROGRESS_CHANNEL_CAPACITY: usize = 100;

/// Runs one target through the fetch backend with progress and notifications
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn MediaFetcher>,
    notifier: Arc<dyn Notifier>,
    display: ProgressDisplay,
    merge_output_format: String,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            fetcher,
            notifier,
            display: ProgressDisplay::default(),
            merge_output_format: "mp4".to_string(),
        }
    }

    /// Draw progress somewhere other than a stand-alone terminal bar
    pub fn with_display(mut self, display: ProgressDisplay) -> Self {
        self.display = display;
        self
    }

    /// Container the fetched streams are merged into
    pub fn with_merge_output_format(mut self, format: impl Into<String>) -> Self {
        self.merge_output_format = format.into();
        self
    }

    pub fn display(&self) -> &ProgressDisplay {
        &self.display
    }

    /// Same downloader drawing into `display`
    pub fn for_display(&self, display: ProgressDisplay) -> Self {
        self.clone().with_display(display)
    }

    /// Download one video to `<output>/<title>.<ext>`
    pub async fn download_video(&self, url: &str, options: &DownloadOptions) -> Result<()> {
        self.download(&DownloadRequest::video(url, options.clone())).await
    }

    /// Download a playlist to `<output>/<playlist>/<title>.<ext>`
    pub async fn download_playlist(&self, url: &str, options: &DownloadOptions) -> Result<()> {
        self.download(&DownloadRequest::playlist(url, options.clone()))
            .await
    }

    /// Download one request.
    ///
    /// Failures are logged and announced, then returned so a retry wrapper
    /// can see them.
    pub async fn download(&self, request: &DownloadRequest) -> Result<()> {
        let options = request.fetch_options(&self.merge_output_format);
        let subject = match request.kind {
            TargetKind::Video => "",
            TargetKind::Playlist => " playlist",
        };

        let (progress_tx, progress_rx) = mpsc::channel::<ProgressEvent>(PROGRESS_CHANNEL_CAPACITY);
        let reporter = ProgressReporter::new(self.display.clone());
        let reporter_handle = tokio::spawn(reporter.run(progress_rx));

        info!(
            backend = self.fetcher.id(),
            template = %options.output_template,
            "Starting {} download: {}",
            request.kind.noun(),
            request.target
        );
        let result = self.fetcher.fetch(&request.target, &options, progress_tx).await;

        // The sender was moved into the fetch call; the reporter ends once it drains
        if let Err(e) = reporter_handle.await {
            warn!("Progress reporter for {} stopped abnormally: {}", request.target, e);
        }

        match result {
            Ok(()) => {
                info!("Successfully downloaded{}: {}", subject, request.target);
                self.notifier.notify(
                    "Download Complete",
                    &format!("Successfully downloaded{}: {}", subject, request.target),
                );
                Ok(())
            }
            Err(e) => {
                error!("Error downloading{} {}: {:#}", subject, request.target, e);
                self.notifier.notify(
                    "Download Failed",
                    &format!("Error downloading{} {}: {}", subject, request.target, e),
                );
                Err(e)
            }
        }
    }
}
