//! Mock fetch backend and notifier shared by the integration tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use vidfetch::downloader::{DownloadOptions, Downloader, ProgressDisplay, SubtitleOptions};
use vidfetch::{FetchOptions, MediaFetcher, Notifier, ProgressEvent};

/// What the mock does for a given URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    /// Fail this many times, then succeed
    FailTimes(usize),
    AlwaysFail,
    Panic,
}

/// Scripted backend that counts calls and tracks concurrency
pub struct MockFetcher {
    behaviors: HashMap<String, Behavior>,
    work_time: Duration,
    calls: Mutex<HashMap<String, usize>>,
    requests: Mutex<Vec<(String, FetchOptions)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new(work_time: Duration) -> Self {
        Self {
            behaviors: HashMap::new(),
            work_time,
            calls: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, url: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(url.to_string(), behavior);
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn requests(&self) -> Vec<(String, FetchOptions)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn fetch(
        &self,
        target: &str,
        options: &FetchOptions,
        progress_tx: mpsc::Sender<ProgressEvent>,
    ) -> Result<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(target.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        self.requests
            .lock()
            .unwrap()
            .push((target.to_string(), options.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let filename = format!("{}.mp4", target);
        for downloaded in [25u64, 50, 100] {
            let _ = progress_tx
                .send(ProgressEvent::Downloading {
                    filename: filename.clone(),
                    downloaded_bytes: downloaded,
                    total_bytes: Some(100),
                })
                .await;
        }
        tokio::time::sleep(self.work_time).await;

        let behavior = self
            .behaviors
            .get(target)
            .copied()
            .unwrap_or(Behavior::Succeed);
        match behavior {
            Behavior::Succeed => {}
            Behavior::FailTimes(n) if call > n => {}
            Behavior::FailTimes(_) | Behavior::AlwaysFail => {
                anyhow::bail!("ERROR: unable to download {}", target);
            }
            Behavior::Panic => panic!("mock fetcher bug for {}", target),
        }

        let _ = progress_tx.send(ProgressEvent::Finished { filename }).await;
        Ok(())
    }
}

/// Notifier that remembers what it was asked to show
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent().into_iter().map(|(title, _)| title).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

pub fn downloader(fetcher: Arc<MockFetcher>, notifier: Arc<RecordingNotifier>) -> Downloader {
    Downloader::new(fetcher, notifier).with_display(ProgressDisplay::Hidden)
}

pub fn options(output_dir: &str) -> DownloadOptions {
    DownloadOptions {
        output_dir: PathBuf::from(output_dir),
        format: "bestvideo+bestaudio/best".to_string(),
        subtitles: SubtitleOptions::default(),
    }
}

pub fn urls(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
