use colored::*;
use dir_reconcile_core::{
    FileError, Outcome, OutcomeKind, ProgressReporter, ReconcileOptions, SourceDisposition,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// CLI reporter: a spinner while the source tree is walked, one log line per
/// classification decision.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_run_start(&self, _destination: &Path, _source: &Path, _options: &ReconcileOptions) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message("Reconciling...");
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_file_discovered(&self, files_discovered: usize, relative_path: &Path) {
        self.with_bar(|pb| {
            pb.set_message(format!(
                "{} files... {}",
                files_discovered,
                relative_path.display()
            ))
        });
    }

    fn on_outcome(&self, outcome: &Outcome) {
        let line = render_outcome(outcome);
        let mut printed = false;
        self.with_bar(|pb| {
            pb.suspend(|| info!("{}", line));
            printed = true;
        });
        if !printed {
            info!("{}", line);
        }
    }

    fn on_file_error(&self, _error: &FileError) {
        // Already logged by the engine; keep the spinner in step.
        self.with_bar(|pb| pb.tick());
    }

    fn on_disposition(&self, _disposition: &SourceDisposition) {
        self.finish_bar();
    }
}

fn render_outcome(outcome: &Outcome) -> String {
    let path = outcome.relative_path.display();
    match outcome.kind {
        OutcomeKind::RemovedAsDestinationDuplicate => {
            format!("{} {}", "Removed duplicate file".green(), path)
        }
        OutcomeKind::MovedToDestination => format!("{} {}", "Moved missing file".cyan(), path),
        OutcomeKind::RemovedAsInternalDuplicate => format!(
            "{} {} (copy of {})",
            "Removed duplicate file".green(),
            path,
            display_or_empty(outcome.duplicate_of.as_deref()),
        ),
        OutcomeKind::FlaggedAsConflict => format!(
            "{} {} differs in destination. Please handle manually...",
            "Conflict:".red(),
            path
        ),
        OutcomeKind::FlaggedAsUnresolvedDuplicate => format!(
            "{} {} is a copy of {}",
            "Duplicate:".yellow(),
            path,
            display_or_empty(outcome.duplicate_of.as_deref()),
        ),
    }
}

pub fn display_or_empty(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}
