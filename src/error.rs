use crate::scheduler::CycleError;
use crate::{config, engine, manifest};

/// Errors that end the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] config::Error),
    #[error("container engine unavailable: {0}")]
    Connection(#[from] engine::Error),
    #[error("manifest file unavailable: {0}")]
    Io(#[from] manifest::Error),
}

impl From<CycleError> for Error {
    fn from(err: CycleError) -> Self {
        match err {
            CycleError::Collect(err) => Error::Connection(err),
            CycleError::Publish(err) => Error::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
