use crate::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A non-directory entry found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    /// The entry is a symlink. Its bytes are never read through the link.
    pub is_symlink: bool,
}

/// An entry the walker could not read. Traversal continues past it.
#[derive(Debug)]
pub struct WalkFailure {
    pub relative_path: PathBuf,
    pub error: io::Error,
}

/// Check that the source root can be enumerated at all. This is the only failure
/// that aborts a run.
pub fn open_source_root(root: &Path) -> Result<(), Error> {
    let metadata = match fs::metadata(root) {
        Ok(m) => m,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(root.to_path_buf()));
        }
        Err(source) => {
            return Err(Error::SourceUnreadable {
                path: root.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(Error::SourceNotDirectory(root.to_path_buf()));
    }

    fs::read_dir(root).map_err(|source| Error::SourceUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Depth-first, iterative traversal of every non-directory entry under a root.
///
/// Siblings are visited in file-name order and each directory is read in full
/// before its entries are yielded, so files may be moved or deleted between calls
/// to `next`. Symlinks are yielded as entries and never followed.
pub struct SourceWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl SourceWalker {
    pub fn new(root: &Path) -> Self {
        let inner = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter();
        Self {
            root: root.to_path_buf(),
            inner,
        }
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(Path::to_path_buf)
    }
}

impl Iterator for SourceWalker {
    type Item = Result<SourceEntry, WalkFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let relative_path = err
                        .path()
                        .and_then(|p| self.relative(p))
                        .unwrap_or_default();
                    return Some(Err(WalkFailure {
                        relative_path,
                        error: err.into(),
                    }));
                }
            };

            if entry.file_type().is_dir() {
                debug!("Entering {}", entry.path().display());
                continue;
            }

            let Some(relative_path) = self.relative(entry.path()) else {
                return Some(Err(WalkFailure {
                    relative_path: entry.path().to_path_buf(),
                    error: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "entry is outside the source root",
                    ),
                }));
            };

            let is_symlink = entry.path_is_symlink();
            return Some(Ok(SourceEntry {
                path: entry.into_path(),
                relative_path,
                is_symlink,
            }));
        }
    }
}
