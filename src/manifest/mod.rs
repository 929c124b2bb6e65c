//! The published manifest: how it is assembled from a container snapshot and
//! how it is written to disk.
mod error;
mod publisher;
mod reconcile;

pub use error::{Error, Result};
pub use publisher::{MANIFEST_MODE, ManifestPublisher, read_manifest};
pub use reconcile::reconcile;

use crate::app::AppDescriptor;

/// Ordered collection of app descriptors, serialized as `{ "apps": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    apps: Vec<AppDescriptor>,
}

impl Manifest {
    pub fn new(apps: Vec<AppDescriptor>) -> Self {
        Self { apps }
    }

    pub fn apps(&self) -> &[AppDescriptor] {
        &self.apps
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Renders the manifest as pretty-printed JSON.
    ///
    /// Field order and indentation are fixed, so equal manifests always render
    /// to the same bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(Error::Serialize)
    }
}

impl From<Vec<AppDescriptor>> for Manifest {
    fn from(apps: Vec<AppDescriptor>) -> Self {
        Self::new(apps)
    }
}
