//! Filesystem helpers: existence checks and file copy.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("destination unavailable: {} does not exist", .0.display())]
    DestinationUnavailable(PathBuf),
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

/// True if `file_path` names an existing regular file. Directories, broken
/// links and unreadable paths all answer `false`.
pub fn file_exists(file_path: impl AsRef<Path>) -> bool {
    fs::metadata(file_path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

/// Keep the entries with nothing on disk at that path, in input order.
/// Every occurrence of a repeated path is checked and kept on its own.
pub fn find_nonexistent_files<S: AsRef<Path> + Clone>(paths: &[S]) -> Vec<S> {
    paths
        .iter()
        .filter(|path| fs::metadata(path).is_err())
        .cloned()
        .collect()
}

/// Copy `source` to `destination`, creating or truncating the destination.
///
/// The destination's parent directory is only created when
/// `create_dest_if_not_exists` is `Some(true)`.
pub fn copy_file(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    create_dest_if_not_exists: Option<bool>,
) -> Result<(), FileError> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    if !file_exists(source) {
        return Err(FileError::SourceNotFound(source.to_path_buf()));
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            if !create_dest_if_not_exists.unwrap_or(false) {
                return Err(FileError::DestinationUnavailable(parent.to_path_buf()));
            }
            debug!(dir = %parent.display(), "creating destination directory");
            fs::create_dir_all(parent).map_err(|source| FileError::Io {
                action: "create",
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let bytes = fs::copy(source, destination).map_err(|e| FileError::Io {
        action: "copy to",
        path: destination.to_path_buf(),
        source: e,
    })?;
    debug!(
        from = %source.display(),
        to = %destination.display(),
        bytes,
        "copied file"
    );
    Ok(())
}
