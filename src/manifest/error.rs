use std::path::PathBuf;

use crate::fsutil;

/// Failures creating, writing or reading the manifest file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Write(#[from] fsutil::AtomicWriteError),
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse manifest `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
