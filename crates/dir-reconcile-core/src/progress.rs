use crate::model::{FileError, Outcome, ReconcileOptions, RunSummary, SourceDisposition};
use std::path::Path;

/// Trait for observing a reconcile run.
///
/// Every classification decision, per-file failure and the final disposition of the
/// source tree is delivered here. The CLI renders them with tracing/indicatif; tests
/// record them. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_run_start(&self, _destination: &Path, _source: &Path, _options: &ReconcileOptions) {}
    fn on_file_discovered(&self, _files_discovered: usize, _relative_path: &Path) {}
    fn on_outcome(&self, _outcome: &Outcome) {}
    fn on_file_error(&self, _error: &FileError) {}
    fn on_disposition(&self, _disposition: &SourceDisposition) {}
    fn on_run_complete(&self, _summary: &RunSummary) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
