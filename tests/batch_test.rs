//! Batch orchestration: bounded concurrency and failure isolation

mod common;

use common::{downloader, options, urls, Behavior, MockFetcher, RecordingNotifier};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use vidfetch::batch::{BatchOrchestrator, TaskOutcome};
use vidfetch::downloader::{AttemptOutcome, RetryPolicy};

fn policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(5))
}

#[tokio::test(start_paused = true)]
async fn test_all_items_complete() {
    let fetcher = Arc::new(MockFetcher::new(Duration::from_secs(2)));
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator = BatchOrchestrator::new(downloader(fetcher.clone(), notifier), policy(), 5);

    let batch: Vec<String> = (0..12).map(|i| format!("https://example/watch?v={}", i)).collect();
    let report = orchestrator.run(&batch, &options("/tmp/out")).await;

    assert_eq!(report.total(), 12);
    assert_eq!(report.succeeded(), 12);
    let seen: HashSet<&str> = report.items.iter().map(|i| i.url.as_str()).collect();
    let expected: HashSet<&str> = batch.iter().map(String::as_str).collect();
    assert_eq!(seen, expected, "no URL may be skipped or duplicated");
    assert_eq!(fetcher.total_calls(), 12);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_bounded_by_workers() {
    let fetcher = Arc::new(MockFetcher::new(Duration::from_secs(10)));
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator = BatchOrchestrator::new(downloader(fetcher.clone(), notifier), policy(), 5);

    let batch: Vec<String> = (0..23).map(|i| format!("u{}", i)).collect();
    let report = orchestrator.run(&batch, &options("/tmp/out")).await;

    assert_eq!(report.total(), 23);
    assert_eq!(fetcher.max_in_flight(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_single_worker_runs_sequentially() {
    let fetcher = Arc::new(MockFetcher::new(Duration::from_secs(1)));
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator = BatchOrchestrator::new(downloader(fetcher.clone(), notifier), policy(), 0);

    assert_eq!(orchestrator.workers(), 1);
    let report = orchestrator.run(&urls(&["a", "b", "c"]), &options("/tmp/out")).await;

    assert_eq!(report.succeeded(), 3);
    assert_eq!(fetcher.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failing_item_does_not_block_others() {
    let fetcher = Arc::new(
        MockFetcher::new(Duration::from_secs(1)).with("C", Behavior::AlwaysFail),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator =
        BatchOrchestrator::new(downloader(fetcher.clone(), notifier.clone()), policy(), 5);

    let report = orchestrator
        .run(&urls(&["A", "B", "C", "D"]), &options("/tmp/out"))
        .await;

    assert_eq!(report.total(), 4);
    assert_eq!(report.succeeded(), 3);

    let failed: Vec<&str> = report.failed().map(|i| i.url.as_str()).collect();
    assert_eq!(failed, vec!["C"]);
    match &report.failed().next().unwrap().outcome {
        TaskOutcome::Finished(AttemptOutcome::Exhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(*attempts, 3);
            assert!(last_error.to_string().contains("unable to download C"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(fetcher.calls("C"), 3);
    assert_eq!(fetcher.calls("A"), 1);

    let titles = notifier.titles();
    assert_eq!(titles.iter().filter(|t| *t == "Download Failed").count(), 3);
    assert_eq!(titles.iter().filter(|t| *t == "Download Complete").count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_flaky_item_recovers_within_budget() {
    let fetcher = Arc::new(
        MockFetcher::new(Duration::from_millis(100)).with("B", Behavior::FailTimes(2)),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator = BatchOrchestrator::new(downloader(fetcher.clone(), notifier), policy(), 5);

    let report = orchestrator.run(&urls(&["A", "B"]), &options("/tmp/out")).await;

    assert_eq!(report.succeeded(), 2);
    let b = report.items.iter().find(|i| i.url == "B").unwrap();
    match &b.outcome {
        TaskOutcome::Finished(outcome) => assert_eq!(outcome.attempts_used(), 3),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_panicking_item_is_reported_and_siblings_finish() {
    let fetcher = Arc::new(
        MockFetcher::new(Duration::from_secs(1)).with("boom", Behavior::Panic),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator = BatchOrchestrator::new(downloader(fetcher.clone(), notifier), policy(), 2);

    let report = orchestrator
        .run(&urls(&["a", "boom", "b", "c"]), &options("/tmp/out"))
        .await;

    assert_eq!(report.total(), 4);
    assert_eq!(report.succeeded(), 3);
    let boom = report.items.iter().find(|i| i.url == "boom").unwrap();
    match &boom.outcome {
        TaskOutcome::Panicked(message) => assert!(message.contains("mock fetcher bug")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    // A panic is not retried
    assert_eq!(fetcher.calls("boom"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_item_uses_flat_video_template() {
    let fetcher = Arc::new(MockFetcher::new(Duration::from_millis(10)));
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator = BatchOrchestrator::new(downloader(fetcher.clone(), notifier), policy(), 5);

    orchestrator.run(&urls(&["x", "y"]), &options("/tmp/out")).await;

    for (_, fetch_options) in fetcher.requests() {
        assert!(fetch_options.output_template.ends_with("%(title)s.%(ext)s"));
        assert!(!fetch_options.output_template.contains("%(playlist)s"));
    }
}
