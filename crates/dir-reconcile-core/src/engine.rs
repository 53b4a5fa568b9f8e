use crate::error::Error;
use crate::hasher::{ContentIdentity, Fingerprint};
use crate::model::{
    FileError, FileOperation, IdentityPolicy, Outcome, OutcomeKind, ReconcileOptions,
    RunSummary, SourceDisposition,
};
use crate::platform;
use crate::progress::{ProgressReporter, SilentReporter};
use crate::scanner::{self, SourceEntry, SourceWalker};
use ahash::AHashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct ReconcileEngine {
    options: ReconcileOptions,
}

impl ReconcileEngine {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Merge `source` into `destination`:
    /// 1. Validate both roots (the only fatal failures, raised before any mutation)
    /// 2. Walk the source tree and classify/act on every file
    /// 3. Remove the source tree when nothing was left behind in it
    pub fn reconcile(
        &self,
        destination: &Path,
        source: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunSummary, Error> {
        let start = Instant::now();

        let source_root = platform::normalize_root(source)?;
        scanner::open_source_root(&source_root)?;
        let destination_root = platform::normalize_root(destination)?;

        if platform::roots_overlap(&destination_root, &source_root) {
            return Err(Error::OverlappingRoots {
                destination: destination_root,
                source_root,
            });
        }

        info!(
            "Reconciling {} into {}{}",
            source_root.display(),
            destination_root.display(),
            if self.options.simulate { " (simulated)" } else { "" },
        );
        reporter.on_run_start(&destination_root, &source_root, &self.options);

        let mut ctx = RunContext::new(&self.options, &destination_root, &source_root, reporter);

        for item in SourceWalker::new(&source_root) {
            ctx.files_discovered += 1;
            match item {
                Ok(entry) => {
                    reporter.on_file_discovered(ctx.files_discovered, &entry.relative_path);
                    ctx.process(entry);
                }
                Err(failure) => ctx.record_error(FileError::new(
                    failure.relative_path,
                    FileOperation::Walk,
                    &failure.error,
                )),
            }
        }

        let disposition = ctx.finish();
        reporter.on_disposition(&disposition);

        let summary = RunSummary {
            destination: destination_root.clone(),
            source: source_root.clone(),
            simulated: self.options.simulate,
            files_discovered: ctx.files_discovered,
            outcomes: ctx.outcomes,
            errors: ctx.errors,
            disposition,
            duration: start.elapsed(),
        };

        info!(
            "Reconcile finished in {:.2}s: {} files, {} outcomes, {} errors, source {}",
            summary.duration.as_secs_f64(),
            summary.files_discovered,
            summary.outcomes.len(),
            summary.errors.len(),
            summary.disposition,
        );
        reporter.on_run_complete(&summary);

        Ok(summary)
    }
}

/// Reconcile with a silent reporter.
pub fn reconcile(
    destination: &Path,
    source: &Path,
    options: ReconcileOptions,
) -> Result<RunSummary, Error> {
    ReconcileEngine::new(options).reconcile(destination, source, &SilentReporter)
}

/// What makes two source entries copies of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EntryIdentity {
    Content(Fingerprint),
    /// A symlink is keyed by where it points, never by the bytes behind it, so a
    /// link can never stand in for the file it targets.
    LinkTarget(PathBuf),
}

/// State for a single `reconcile` call. Dropped when the call returns.
struct RunContext<'a> {
    options: &'a ReconcileOptions,
    identity: ContentIdentity,
    destination_root: &'a Path,
    source_root: &'a Path,
    reporter: &'a dyn ProgressReporter,
    seen_by_relative_path: AHashMap<PathBuf, PathBuf>,
    seen_by_identity: AHashMap<EntryIdentity, PathBuf>,
    files_discovered: usize,
    outcomes: Vec<Outcome>,
    errors: Vec<FileError>,
}

impl<'a> RunContext<'a> {
    fn new(
        options: &'a ReconcileOptions,
        destination_root: &'a Path,
        source_root: &'a Path,
        reporter: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            options,
            identity: ContentIdentity::new(options.hash_algorithm, options.block_size),
            destination_root,
            source_root,
            reporter,
            seen_by_relative_path: AHashMap::new(),
            seen_by_identity: AHashMap::new(),
            files_discovered: 0,
            outcomes: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn process(&mut self, entry: SourceEntry) {
        let candidate = self.destination_root.join(&entry.relative_path);

        match fs::metadata(&candidate) {
            Ok(metadata) => self.process_existing(entry, candidate, metadata.is_file()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                self.process_missing(entry, candidate)
            }
            Err(err) => {
                self.record_error(FileError::new(
                    entry.relative_path,
                    FileOperation::Compare,
                    &err,
                ));
            }
        }
    }

    /// The destination already has something at this relative path.
    fn process_existing(&mut self, entry: SourceEntry, candidate: PathBuf, is_file: bool) {
        // A directory (or other non-file) in the way is never equal to a file.
        let equal = if is_file {
            match self.identity.content_equals(&entry.path, &candidate) {
                Ok(equal) => equal,
                Err(err) => {
                    self.record_error(FileError::new(
                        entry.relative_path,
                        FileOperation::Compare,
                        &err,
                    ));
                    return;
                }
            }
        } else {
            false
        };

        if !equal {
            debug!(
                "Conflict: {} differs in destination, handle manually",
                entry.relative_path.display()
            );
            self.record(Outcome::new(entry.relative_path, OutcomeKind::FlaggedAsConflict));
            return;
        }

        if !self.delete_source(&entry) {
            return;
        }
        self.record(Outcome::duplicate(
            entry.relative_path,
            OutcomeKind::RemovedAsDestinationDuplicate,
            candidate,
        ));
    }

    /// Nothing at this relative path in the destination yet.
    fn process_missing(&mut self, entry: SourceEntry, candidate: PathBuf) {
        let identity = match self.entry_identity(&entry) {
            Ok(identity) => identity,
            Err(err) => {
                self.record_error(FileError::new(
                    entry.relative_path,
                    FileOperation::Fingerprint,
                    &err,
                ));
                return;
            }
        };

        if let Some(first_seen) = self.first_seen(&entry.relative_path, &identity) {
            let first_seen = first_seen.to_path_buf();
            debug!(
                "{} is a copy of {}",
                entry.relative_path.display(),
                first_seen.display()
            );

            if !self.options.remove_all_duplicates {
                self.record(Outcome::duplicate(
                    entry.relative_path,
                    OutcomeKind::FlaggedAsUnresolvedDuplicate,
                    first_seen,
                ));
                return;
            }

            if !self.delete_source(&entry) {
                return;
            }
            self.record(Outcome::duplicate(
                entry.relative_path,
                OutcomeKind::RemovedAsInternalDuplicate,
                first_seen,
            ));
            return;
        }

        if !self.options.simulate && !self.move_source(&entry, &candidate) {
            return;
        }

        // Only files that actually reached the destination reserve their keys.
        self.seen_by_relative_path
            .insert(entry.relative_path.clone(), entry.path.clone());
        self.seen_by_identity.insert(identity, entry.path);
        self.record(Outcome::new(entry.relative_path, OutcomeKind::MovedToDestination));
    }

    fn entry_identity(&self, entry: &SourceEntry) -> io::Result<EntryIdentity> {
        if !entry.is_symlink {
            return self.identity.fingerprint(&entry.path).map(EntryIdentity::Content);
        }

        let target = fs::read_link(&entry.path)?;
        let target = match entry.path.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target,
        };
        Ok(EntryIdentity::LinkTarget(target))
    }

    fn first_seen(&self, relative_path: &Path, identity: &EntryIdentity) -> Option<&Path> {
        let by_path = match self.options.identity_policy {
            IdentityPolicy::ContentOrPath => self.seen_by_relative_path.get(relative_path),
            IdentityPolicy::Content => None,
        };
        by_path
            .or_else(|| self.seen_by_identity.get(identity))
            .map(PathBuf::as_path)
    }

    /// Returns false (after recording the error) when the delete failed.
    fn delete_source(&mut self, entry: &SourceEntry) -> bool {
        if self.options.simulate {
            return true;
        }
        match fs::remove_file(&entry.path) {
            Ok(()) => true,
            Err(err) => {
                self.record_error(FileError::new(
                    entry.relative_path.clone(),
                    FileOperation::Delete,
                    &err,
                ));
                false
            }
        }
    }

    fn move_source(&mut self, entry: &SourceEntry, candidate: &Path) -> bool {
        if let Some(parent) = candidate.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                self.record_error(FileError::new(
                    entry.relative_path.clone(),
                    FileOperation::CreateDirectory,
                    &err,
                ));
                return false;
            }
        }

        match platform::move_file(&entry.path, candidate) {
            Ok(()) => true,
            Err(err) => {
                self.record_error(FileError::new(
                    entry.relative_path.clone(),
                    FileOperation::Move,
                    &err,
                ));
                false
            }
        }
    }

    fn record(&mut self, outcome: Outcome) {
        debug!("{}: {}", outcome.kind, outcome.relative_path.display());
        self.reporter.on_outcome(&outcome);
        self.outcomes.push(outcome);
    }

    fn record_error(&mut self, file_error: FileError) {
        error!("{}", file_error);
        self.reporter.on_file_error(&file_error);
        self.errors.push(file_error);
    }

    fn finish(&self) -> SourceDisposition {
        let conflicts = self
            .outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::FlaggedAsConflict)
            .count();
        let unresolved = self
            .outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::FlaggedAsUnresolvedDuplicate)
            .count();

        if conflicts > 0 {
            warn!(
                "{} conflicts to resolve, leaving {} in place",
                conflicts,
                self.source_root.display()
            );
            return SourceDisposition::LeftWithConflicts;
        }

        if unresolved > 0 {
            warn!(
                "{} duplicates to remove, leaving {} in place",
                unresolved,
                self.source_root.display()
            );
            return SourceDisposition::LeftWithUnresolvedDuplicates;
        }

        if !self.errors.is_empty() {
            warn!(
                "{} files failed, leaving {} in place",
                self.errors.len(),
                self.source_root.display()
            );
            return SourceDisposition::LeftWithErrors;
        }

        if self.options.simulate {
            info!("{} would be removed", self.source_root.display());
            return SourceDisposition::Cleared;
        }

        match fs::remove_dir_all(self.source_root) {
            Ok(()) => {
                info!("{} cleared and removed", self.source_root.display());
                SourceDisposition::Cleared
            }
            Err(err) => {
                error!(
                    "{} could not be removed: {}",
                    self.source_root.display(),
                    err
                );
                SourceDisposition::RemovalFailed {
                    message: err.to_string(),
                }
            }
        }
    }
}
