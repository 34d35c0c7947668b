//! Terminal progress for a single download

use crate::fetcher::ProgressEvent;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{debug, trace};

const BAR_TEMPLATE: &str =
    "{spinner:.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec} ETA {eta} - {msg}";

/// Where progress bars are drawn
#[derive(Clone, Default)]
pub enum ProgressDisplay {
    /// A stand-alone bar on stderr
    #[default]
    Terminal,
    /// A row in a shared multi-bar (batch mode)
    Multi(MultiProgress),
    /// Nothing is drawn
    Hidden,
}

/// Byte counters of the download in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub total_bytes: Option<u64>,
    pub downloaded_bytes: u64,
    pub label: String,
}

/// Returned once per completed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedDownload {
    pub label: String,
    pub total_bytes: Option<u64>,
    pub downloaded_bytes: u64,
}

/// Turns progress events into a progress bar.
///
/// yt-dlp may fetch several files for one target (separate video and audio
/// streams), so a reporter goes through one state per file: created by the
/// first `Downloading` event, discarded on `Finished`.
pub struct ProgressReporter {
    display: ProgressDisplay,
    state: Option<ProgressState>,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(display: ProgressDisplay) -> Self {
        Self {
            display,
            state: None,
            bar: None,
        }
    }

    /// Reporter that draws nothing
    pub fn hidden() -> Self {
        Self::new(ProgressDisplay::Hidden)
    }

    /// State of the file currently downloading
    pub fn state(&self) -> Option<&ProgressState> {
        self.state.as_ref()
    }

    /// Bar of the file currently downloading, if its size is known
    pub fn bar(&self) -> Option<&ProgressBar> {
        self.bar.as_ref()
    }

    /// Consume events until the sender side is dropped
    pub async fn run(mut self, mut progress_rx: mpsc::Receiver<ProgressEvent>) {
        while let Some(event) = progress_rx.recv().await {
            if let Some(done) = self.handle(event) {
                debug!(
                    downloaded_bytes = done.downloaded_bytes,
                    total_bytes = ?done.total_bytes,
                    "Completed file {}",
                    done.label
                );
            }
        }
        self.abandon();
    }

    /// Apply one event
    pub fn handle(&mut self, event: ProgressEvent) -> Option<FinishedDownload> {
        match event {
            ProgressEvent::Downloading {
                filename,
                downloaded_bytes,
                total_bytes,
            } => {
                self.on_downloading(filename, downloaded_bytes, total_bytes);
                None
            }
            ProgressEvent::Finished { filename } => self.on_finished(filename),
            ProgressEvent::Other { status } => {
                trace!("Ignoring progress status '{}'", status);
                None
            }
        }
    }

    fn on_downloading(&mut self, filename: String, downloaded: u64, total: Option<u64>) {
        let state = self.state.get_or_insert_with(|| ProgressState {
            total_bytes: None,
            downloaded_bytes: 0,
            label: filename,
        });

        if state.total_bytes.is_none() {
            state.total_bytes = total;
        }
        // The display never moves backwards
        state.downloaded_bytes = state.downloaded_bytes.max(downloaded);

        if self.bar.is_none() {
            if let Some(total) = state.total_bytes {
                self.bar = Some(make_progress_bar(&self.display, total, &state.label));
            }
        }
        if let Some(bar) = &self.bar {
            bar.set_position(state.downloaded_bytes);
        }
    }

    fn on_finished(&mut self, filename: String) -> Option<FinishedDownload> {
        let state = self.state.take()?;

        let mut downloaded_bytes = state.downloaded_bytes;
        if let Some(bar) = self.bar.take() {
            let length = bar.length().unwrap_or(state.downloaded_bytes);
            bar.set_position(length);
            bar.finish();
            downloaded_bytes = length;
        }

        let label = if filename.is_empty() {
            state.label
        } else {
            filename
        };
        self.println(&format!("Finished downloading {}", label));

        Some(FinishedDownload {
            label,
            total_bytes: state.total_bytes,
            downloaded_bytes,
        })
    }

    /// Release a bar left behind by a failed download
    fn abandon(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
        if let Some(state) = self.state.take() {
            debug!(
                "Discarding progress for {} at {} bytes",
                state.label, state.downloaded_bytes
            );
        }
    }

    fn println(&self, line: &str) {
        match &self.display {
            ProgressDisplay::Terminal => println!("{}", line),
            ProgressDisplay::Multi(multi) => {
                if multi.println(line).is_err() {
                    println!("{}", line);
                }
            }
            ProgressDisplay::Hidden => {}
        }
    }
}

fn make_progress_bar(display: &ProgressDisplay, total: u64, label: &str) -> ProgressBar {
    let bar = match display {
        ProgressDisplay::Terminal => ProgressBar::new(total),
        ProgressDisplay::Multi(multi) => multi.add(ProgressBar::new(total)),
        ProgressDisplay::Hidden => {
            ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden())
        }
    };
    if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
        bar.set_style(style.progress_chars("━━╌"));
    }
    bar.set_message(label.to_string());
    bar
}
