use crate::{engine, manifest};

use super::Phase;

/// Why a reconciliation cycle ended early.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("failed to collect container snapshot: {0}")]
    Collect(#[source] engine::Error),
    #[error("failed to publish manifest: {0}")]
    Publish(#[source] manifest::Error),
}

impl CycleError {
    /// The phase the cycle was in when it failed.
    pub fn phase(&self) -> Phase {
        match self {
            CycleError::Collect(_) => Phase::Collecting,
            CycleError::Publish(_) => Phase::Publishing,
        }
    }
}
