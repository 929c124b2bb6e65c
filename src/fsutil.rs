use std::fs::{File, Permissions};
use std::io::{self, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Error that occurs when opening a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Errors of [`replace_atomically`]. The destination is unchanged in all cases.
#[derive(Debug, thiserror::Error)]
pub enum AtomicWriteError {
    #[error("failed to create temporary file in `{dir}`: {source}")]
    TempFile {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write temporary file for `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to set permissions on temporary file for `{path}`: {source}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to move temporary file onto `{path}`: {source}")]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use sui_discovery::fsutil;
/// let reader = fsutil::open_file_reader("/some/file.txt")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Replaces the contents of `path` so that readers see either the old or the
/// new contents, never a mix.
///
/// The data is written to a temporary file next to `path`, synced, given
/// `mode` and renamed over `path`. The temporary file is removed on failure.
///
/// # Errors
///
/// Returns an [`AtomicWriteError`] naming the step that failed.
pub fn replace_atomically(
    path: impl AsRef<Path>,
    contents: &[u8],
    mode: u32,
) -> Result<(), AtomicWriteError> {
    let path = path.as_ref();
    let dir = parent_dir(path);

    let mut tmp = tempfile::Builder::new()
        .prefix(".tmp-")
        .tempfile_in(dir)
        .map_err(|source| AtomicWriteError::TempFile {
            dir: dir.to_path_buf(),
            source,
        })?;

    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|source| AtomicWriteError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tmp.as_file()
        .set_permissions(Permissions::from_mode(mode))
        .map_err(|source| AtomicWriteError::Permissions {
            path: path.to_path_buf(),
            source,
        })?;

    tmp.persist(path)
        .map_err(|err| AtomicWriteError::Rename {
            path: path.to_path_buf(),
            source: err.error,
        })?;

    // The rename is in place; a failed directory sync only weakens durability.
    if let Err(err) = File::open(dir).and_then(|d| d.sync_all()) {
        log::warn!("failed to sync directory `{}`: {}", dir.display(), err);
    }

    Ok(())
}

/// Directory containing `path`, `.` for bare file names.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
