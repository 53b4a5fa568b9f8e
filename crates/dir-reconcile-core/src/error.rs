use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("Cannot read source directory {}: {source}", path.display())]
    SourceUnreadable { path: PathBuf, source: io::Error },

    #[error(
        "Destination {} and source {} overlap",
        destination.display(),
        source_root.display()
    )]
    OverlappingRoots {
        destination: PathBuf,
        source_root: PathBuf,
    },
}
