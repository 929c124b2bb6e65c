use std::path::{Path, PathBuf};

use crate::fsutil;

use super::{Error, Manifest, Result};

/// Permission bits of the published manifest.
pub const MANIFEST_MODE: u32 = 0o644;

/// Writes manifests to a fixed destination path.
///
/// Every publish fully replaces the file through an atomic rename, so a
/// concurrent reader sees either the previous or the new manifest.
#[derive(Debug, Clone)]
pub struct ManifestPublisher {
    path: PathBuf,
}

impl ManifestPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Publishes an empty manifest if the destination does not exist yet, so
    /// readers never find a missing or empty file.
    ///
    /// An existing manifest is kept as is until the first publish replaces it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the file is missing and cannot be written.
    pub fn prepare(&self) -> Result<()> {
        if !self.path.exists() {
            self.publish(&Manifest::default())?;
            log::info!("Created manifest file `{}`", self.path.display());
        }
        Ok(())
    }

    /// Serializes `manifest` and atomically replaces the destination with it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if serialization or any write step fails; the
    /// destination is left untouched in that case.
    pub fn publish(&self, manifest: &Manifest) -> Result<()> {
        let document = manifest.to_json()?;
        fsutil::replace_atomically(&self.path, &document, MANIFEST_MODE)?;
        log::debug!(
            "Published {} apps to `{}`",
            manifest.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Reads a manifest previously written by [`ManifestPublisher::publish`].
///
/// # Errors
///
/// Returns [`Error::FileOpen`] if the file cannot be opened and
/// [`Error::Parse`] if it is not a valid manifest.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let reader = fsutil::open_file_reader(path)?;
    serde_json::from_reader(reader).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}
