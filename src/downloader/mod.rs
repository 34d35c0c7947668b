//! Single-target downloads: request model, progress, retries

pub mod progress;
pub mod request;
pub mod retry;
pub mod single;

// Re-export for convenience
pub use progress::{FinishedDownload, ProgressDisplay, ProgressReporter, ProgressState};
pub use request::{DownloadOptions, DownloadRequest, SubtitleOptions, TargetKind};
pub use retry::{run_with_retries, AttemptOutcome, RetryPolicy};
pub use single::Downloader;
