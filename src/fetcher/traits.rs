use crate::fetcher::models::{FetchOptions, ProgressEvent};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Core trait for media fetch backends
///
/// This trait isolates the download orchestration from the program that
/// actually extracts, selects and muxes the media (yt-dlp, or a mock in tests).
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Returns a unique identifier for this backend (e.g., "yt-dlp")
    fn id(&self) -> &'static str;

    /// Download `target` with the given options.
    ///
    /// Progress is reported through `progress_tx` on a best-effort basis; a
    /// closed receiver must not fail the download. Returns once the backend
    /// has finished with the target.
    async fn fetch(
        &self,
        target: &str,
        options: &FetchOptions,
        progress_tx: mpsc::Sender<ProgressEvent>,
    ) -> Result<()>;
}
