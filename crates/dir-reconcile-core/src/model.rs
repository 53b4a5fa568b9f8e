use crate::hasher::{HashAlgorithm, DEFAULT_BLOCK_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which keys make a source file an internal duplicate of an earlier one.
///
/// `Content` matches on fingerprint only. `ContentOrPath` also matches a relative
/// path that was already reserved in this run, which the traversal never yields
/// twice for a single tree, so it only matters when entries repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityPolicy {
    #[default]
    Content,
    ContentOrPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Delete internal duplicates instead of only flagging them.
    pub remove_all_duplicates: bool,
    /// Classify and report without touching the filesystem.
    pub simulate: bool,
    pub identity_policy: IdentityPolicy,
    pub hash_algorithm: HashAlgorithm,
    pub block_size: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            remove_all_duplicates: true,
            simulate: false,
            identity_policy: IdentityPolicy::default(),
            hash_algorithm: HashAlgorithm::default(),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ReconcileOptions {
    pub fn with_remove_all_duplicates(mut self, remove: bool) -> Self {
        self.remove_all_duplicates = remove;
        self
    }

    pub fn with_simulate(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }

    pub fn with_identity_policy(mut self, policy: IdentityPolicy) -> Self {
        self.identity_policy = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    RemovedAsDestinationDuplicate,
    MovedToDestination,
    RemovedAsInternalDuplicate,
    FlaggedAsConflict,
    FlaggedAsUnresolvedDuplicate,
}

impl OutcomeKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::RemovedAsDestinationDuplicate => "removed-as-destination-duplicate",
            OutcomeKind::MovedToDestination => "moved-to-destination",
            OutcomeKind::RemovedAsInternalDuplicate => "removed-as-internal-duplicate",
            OutcomeKind::FlaggedAsConflict => "flagged-as-conflict",
            OutcomeKind::FlaggedAsUnresolvedDuplicate => "flagged-as-unresolved-duplicate",
        }
    }

    /// Flagged outcomes leave the source file in place for manual handling.
    pub fn is_flagged(&self) -> bool {
        matches!(
            self,
            OutcomeKind::FlaggedAsConflict | OutcomeKind::FlaggedAsUnresolvedDuplicate
        )
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The classification of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub relative_path: PathBuf,
    pub kind: OutcomeKind,
    /// For duplicate outcomes: the destination file or the first-seen source file.
    pub duplicate_of: Option<PathBuf>,
}

impl Outcome {
    pub fn new(relative_path: PathBuf, kind: OutcomeKind) -> Self {
        Self {
            relative_path,
            kind,
            duplicate_of: None,
        }
    }

    pub fn duplicate(relative_path: PathBuf, kind: OutcomeKind, duplicate_of: PathBuf) -> Self {
        Self {
            relative_path,
            kind,
            duplicate_of: Some(duplicate_of),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Walk,
    Fingerprint,
    Compare,
    Delete,
    CreateDirectory,
    Move,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileOperation::Walk => "walk",
            FileOperation::Fingerprint => "fingerprint",
            FileOperation::Compare => "compare",
            FileOperation::Delete => "delete",
            FileOperation::CreateDirectory => "create directory",
            FileOperation::Move => "move",
        };
        f.write_str(name)
    }
}

/// A per-file failure. The file keeps no outcome and stays where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub relative_path: PathBuf,
    pub operation: FileOperation,
    pub message: String,
}

impl FileError {
    pub fn new(relative_path: PathBuf, operation: FileOperation, err: &io::Error) -> Self {
        Self {
            relative_path,
            operation,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {}: {}",
            self.operation,
            self.relative_path.display(),
            self.message
        )
    }
}

/// What happened to the source root once traversal finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDisposition {
    /// Source tree removed (or would have been, when simulating).
    Cleared,
    LeftWithConflicts,
    LeftWithUnresolvedDuplicates,
    /// Some files failed and are still inside the source tree.
    LeftWithErrors,
    RemovalFailed { message: String },
}

impl SourceDisposition {
    pub fn is_cleared(&self) -> bool {
        matches!(self, SourceDisposition::Cleared)
    }
}

impl fmt::Display for SourceDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDisposition::Cleared => f.write_str("cleared"),
            SourceDisposition::LeftWithConflicts => f.write_str("left with conflicts"),
            SourceDisposition::LeftWithUnresolvedDuplicates => {
                f.write_str("left with unresolved duplicates")
            }
            SourceDisposition::LeftWithErrors => f.write_str("left with errors"),
            SourceDisposition::RemovalFailed { message } => {
                write!(f, "removal failed: {}", message)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub destination: PathBuf,
    pub source: PathBuf,
    pub simulated: bool,
    pub files_discovered: usize,
    /// In traversal order.
    pub outcomes: Vec<Outcome>,
    pub errors: Vec<FileError>,
    pub disposition: SourceDisposition,
    pub duration: Duration,
}

impl RunSummary {
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    /// Relative paths that differ between the two trees.
    pub fn conflicts(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::FlaggedAsConflict)
            .map(|o| o.relative_path.as_path())
    }

    /// `(relative path, first-seen path)` pairs left in the source tree.
    pub fn unresolved_duplicates(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::FlaggedAsUnresolvedDuplicate)
            .filter_map(|o| {
                o.duplicate_of
                    .as_deref()
                    .map(|first| (o.relative_path.as_path(), first))
            })
    }

    /// `(relative path, first-seen path)` pairs removed from the source tree.
    pub fn removed_duplicates(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::RemovedAsInternalDuplicate)
            .filter_map(|o| {
                o.duplicate_of
                    .as_deref()
                    .map(|first| (o.relative_path.as_path(), first))
            })
    }
}
