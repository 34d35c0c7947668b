//! vidfetch library

pub mod app;
pub mod batch;
pub mod cli;
pub mod downloader;
pub mod fetcher;
pub mod notifier;
pub mod utils;

// Re-export main types for easier use
pub use batch::{BatchOrchestrator, BatchReport, TaskOutcome};
pub use downloader::{
    run_with_retries, AttemptOutcome, DownloadOptions, DownloadRequest, Downloader,
    ProgressReporter, RetryPolicy,
};
pub use fetcher::{FetchOptions, MediaFetcher, ProgressEvent, YtDlpFetcher};
pub use notifier::{DesktopNotifier, Notifier, SilentNotifier};
pub use utils::{AppSettings, VidfetchError};
