pub mod orchestrator;

pub use orchestrator::{BatchItem, BatchOrchestrator, BatchReport, TaskOutcome, DEFAULT_WORKERS};
