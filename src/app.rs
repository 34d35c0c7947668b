//! Mode dispatch and interrupt handling

use crate::batch::{BatchOrchestrator, BatchReport};
use crate::cli::{retry_policy, Args, Mode};
use crate::downloader::{
    run_with_retries, AttemptOutcome, DownloadOptions, Downloader, ProgressDisplay, RetryPolicy,
};
use crate::fetcher::{MediaFetcher, YtDlpFetcher};
use crate::notifier::{DesktopNotifier, Notifier, SilentNotifier};
use crate::utils::AppSettings;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    Single(AttemptOutcome<anyhow::Error>),
    Batch(BatchReport),
    Interrupted,
}

/// Process exit status when no download mode was given
pub const EXIT_USAGE: u8 = 1;

/// Process exit status when settings cannot be loaded
pub const EXIT_CONFIG: u8 = 1;

/// Process exit status for a finished run.
///
/// Per-item failures are reported in the log and by notification; they do
/// not fail the process. An interrupt is a normal way to end a run.
pub fn exit_status(outcome: &RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Single(_) | RunOutcome::Batch(_) | RunOutcome::Interrupted => 0,
    }
}

/// Everything one invocation needs to download
pub struct Session {
    downloader: Downloader,
    policy: RetryPolicy,
    workers: usize,
    options: DownloadOptions,
}

impl Session {
    pub fn new(
        downloader: Downloader,
        policy: RetryPolicy,
        workers: usize,
        options: DownloadOptions,
    ) -> Self {
        Self {
            downloader,
            policy,
            workers,
            options,
        }
    }

    /// Build the production session: yt-dlp backend, desktop notifications
    pub fn from_settings(args: &Args, settings: &AppSettings) -> Self {
        let fetcher: Arc<dyn MediaFetcher> =
            Arc::new(YtDlpFetcher::locate(settings.ytdlp_path.as_deref()));
        let notifier: Arc<dyn Notifier> = if settings.notifications {
            Arc::new(DesktopNotifier::new())
        } else {
            Arc::new(SilentNotifier)
        };
        let display = if args.quiet {
            ProgressDisplay::Hidden
        } else {
            ProgressDisplay::Terminal
        };

        let downloader = Downloader::new(fetcher, notifier)
            .with_display(display)
            .with_merge_output_format(settings.merge_output_format.clone());

        Self::new(
            downloader,
            retry_policy(settings),
            settings.max_concurrent,
            args.download_options(settings),
        )
    }

    /// Run one mode to completion
    pub async fn execute(&self, mode: Mode) -> RunOutcome {
        match mode {
            Mode::Video(url) => {
                let outcome = run_with_retries(&self.policy, &url, || {
                    self.downloader.download_video(&url, &self.options)
                })
                .await;
                RunOutcome::Single(outcome)
            }
            Mode::Playlist(url) => {
                let outcome = run_with_retries(&self.policy, &url, || {
                    self.downloader.download_playlist(&url, &self.options)
                })
                .await;
                RunOutcome::Single(outcome)
            }
            Mode::Multiple(urls) => {
                let orchestrator =
                    BatchOrchestrator::new(self.downloader.clone(), self.policy, self.workers);
                RunOutcome::Batch(orchestrator.run(&urls, &self.options).await)
            }
        }
    }
}

/// Run `work` unless the user interrupts first.
///
/// Interruption drops `work`, which cancels in-flight downloads.
pub async fn until_interrupted<F, T>(work: F, interrupt: impl Future<Output = ()>) -> Option<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        result = work => Some(result),
        _ = interrupt => None,
    }
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
pub async fn wait_for_interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C signal");
        std::future::pending::<()>().await;
    }
}

/// Download according to `mode`; interruption is a normal outcome
pub async fn run(args: &Args, mode: Mode, settings: &AppSettings) -> RunOutcome {
    let session = Session::from_settings(args, settings);

    match until_interrupted(session.execute(mode), wait_for_interrupt()).await {
        Some(outcome) => outcome,
        None => {
            info!("Download interrupted by user");
            RunOutcome::Interrupted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchItem, TaskOutcome};
    use std::time::Duration;

    #[test]
    fn test_finished_runs_exit_successfully() {
        let exhausted = RunOutcome::Single(AttemptOutcome::Exhausted {
            attempts: 3,
            last_error: anyhow::anyhow!("Video unavailable"),
        });
        assert_eq!(exit_status(&exhausted), 0);

        let succeeded = RunOutcome::Single(AttemptOutcome::Succeeded { attempts: 1 });
        assert_eq!(exit_status(&succeeded), 0);

        let partial = RunOutcome::Batch(BatchReport {
            items: vec![BatchItem {
                url: "C".to_string(),
                outcome: TaskOutcome::Panicked("bug".to_string()),
            }],
        });
        assert_eq!(exit_status(&partial), 0);

        assert_eq!(exit_status(&RunOutcome::Interrupted), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_work_finishing_first_wins() {
        let result = until_interrupted(async { 7 }, std::future::pending()).await;
        assert_eq!(result, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_cancels_work() {
        let work = async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            1
        };
        let interrupt = tokio::time::sleep(Duration::from_secs(1));
        assert_eq!(until_interrupted(work, interrupt).await, None);
    }
}
