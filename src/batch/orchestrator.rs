//! Batch downloads with bounded concurrency

use crate::downloader::{
    run_with_retries, AttemptOutcome, DownloadOptions, DownloadRequest, Downloader,
    ProgressDisplay, RetryPolicy,
};
use futures::FutureExt;
use indicatif::MultiProgress;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Worker count used when none is configured
pub const DEFAULT_WORKERS: usize = 5;

/// How one batch item ended
#[derive(Debug)]
pub enum TaskOutcome {
    /// The retry loop ran to completion (successfully or not)
    Finished(AttemptOutcome<anyhow::Error>),
    /// The task panicked; carries the panic message
    Panicked(String),
}

impl TaskOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, TaskOutcome::Finished(outcome) if outcome.succeeded())
    }
}

/// One batch item, in completion order
#[derive(Debug)]
pub struct BatchItem {
    pub url: String,
    pub outcome: TaskOutcome,
}

/// Outcome of a whole batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.succeeded()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|i| !i.outcome.succeeded())
    }
}

/// Fans single-video downloads out over a fixed number of workers.
///
/// Every URL is attempted; a failing or panicking item never stops the others.
pub struct BatchOrchestrator {
    downloader: Downloader,
    policy: RetryPolicy,
    workers: usize,
}

impl BatchOrchestrator {
    pub fn new(downloader: Downloader, policy: RetryPolicy, workers: usize) -> Self {
        // Concurrent bars need a shared renderer
        let downloader = if matches!(downloader.display(), ProgressDisplay::Terminal) {
            downloader.for_display(ProgressDisplay::Multi(MultiProgress::new()))
        } else {
            downloader
        };
        Self {
            downloader,
            policy,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Download every URL, returning once all of them are done
    pub async fn run(&self, urls: &[String], options: &DownloadOptions) -> BatchReport {
        info!(
            "Starting batch of {} videos with {} workers",
            urls.len(),
            self.workers
        );

        // Permits are handed out in submission order
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for url in urls {
            let request = DownloadRequest::video(url.clone(), options.clone());
            let downloader = self.downloader.clone();
            let policy = self.policy;
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                let url = request.target.clone();
                let work = async {
                    let _permit = permits.acquire().await;
                    run_with_retries(&policy, &request.target, || downloader.download(&request))
                        .await
                };

                let outcome = match AssertUnwindSafe(work).catch_unwind().await {
                    Ok(outcome) => TaskOutcome::Finished(outcome),
                    Err(payload) => TaskOutcome::Panicked(panic_message(payload.as_ref())),
                };
                BatchItem { url, outcome }
            });
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(item) => {
                    log_item(&item);
                    report.items.push(item);
                }
                // Tasks are only cancelled when the set itself is dropped
                Err(e) => error!("Batch task ended unexpectedly: {}", e),
            }
        }

        info!(
            "Batch finished: {}/{} downloaded",
            report.succeeded(),
            report.total()
        );
        report
    }
}

fn log_item(item: &BatchItem) {
    match &item.outcome {
        TaskOutcome::Finished(AttemptOutcome::Succeeded { attempts }) => {
            info!(attempts, "Batch item done: {}", item.url);
        }
        TaskOutcome::Finished(AttemptOutcome::Exhausted {
            attempts,
            last_error,
        }) => {
            warn!(
                attempts,
                "Batch item failed: {}: {:#}", item.url, last_error
            );
        }
        TaskOutcome::Panicked(message) => {
            error!("Error in download task for {}: {}", item.url, message);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
