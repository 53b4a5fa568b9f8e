use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolve a root argument to an absolute path without trailing separators.
///
/// Existing paths are canonicalized so symlinked roots compare correctly; missing
/// paths are made absolute against the current directory.
pub fn normalize_root(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(canonical) => Ok(canonical),
        Err(err) if err.kind() == io::ErrorKind::NotFound => std::path::absolute(path),
        Err(err) => Err(err),
    }
}

/// True when either root contains the other (or they are the same directory).
pub fn roots_overlap(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// Move a single file, falling back to copy + remove when `rename` cannot cross
/// filesystems.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            copy_into_place(from, to)?;
            fs::remove_file(from)
        }
        Err(err) => Err(err),
    }
}

/// Copy `from` to a hidden sibling of `to`, then rename it over `to`.
///
/// `to` never holds a partial file: on any failure the sibling is removed and
/// `to` is left as it was.
fn copy_into_place(from: &Path, to: &Path) -> io::Result<()> {
    let partial = partial_path(to)?;

    let result = fs::copy(from, &partial).and_then(|_| fs::rename(&partial, to));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn partial_path(to: &Path) -> io::Result<PathBuf> {
    let name = to.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", to.display()),
        )
    })?;
    Ok(to.with_file_name(format!(
        ".{}.{}.partial",
        name.to_string_lossy(),
        std::process::id()
    )))
}
