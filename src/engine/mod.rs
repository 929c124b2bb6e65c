//! Container engine integrations.
//!
//! The reconciliation loop only needs a snapshot of the running containers with
//! their names and labels. [`SnapshotProvider`] is that seam; [`docker`] and
//! [`containerd`] implement it over the engines' unix sockets.
use std::collections::HashMap;
use std::path::PathBuf;

pub mod containerd;
pub mod docker;
mod error;
mod socket;

pub use containerd::ContainerdProvider;
pub use docker::DockerProvider;
pub use error::{Error, Result};

/// A running container as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerRecord {
    id: String,
    names: Vec<String>,
    labels: HashMap<String, String>,
}

impl ContainerRecord {
    pub fn new(
        id: impl Into<String>,
        names: Vec<String>,
        labels: HashMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            names,
            labels,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }

    /// First name alias without Docker's leading `/`, or the id if the container
    /// has no names.
    pub fn display_name(&self) -> &str {
        self.names
            .iter()
            .map(|name| name.trim_start_matches('/'))
            .find(|name| !name.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

/// Source of the current container snapshot.
pub trait SnapshotProvider {
    /// Lists the running containers in engine order.
    fn list_containers(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Vec<ContainerRecord>>> + Send;
}

/// Supported container engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EngineKind {
    Docker,
    Containerd,
}

impl EngineKind {
    pub fn default_socket(&self) -> PathBuf {
        match self {
            EngineKind::Docker => PathBuf::from(docker::DEFAULT_SOCKET),
            EngineKind::Containerd => PathBuf::from(containerd::DEFAULT_SOCKET),
        }
    }
}

/// Provider for whichever engine was selected at startup.
pub enum Engine {
    Docker(DockerProvider),
    Containerd(ContainerdProvider),
}

impl Engine {
    /// Connects to the selected engine and verifies that it answers.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the socket cannot be reached or the engine does
    /// not respond to the initial request.
    pub async fn connect(kind: EngineKind, socket_path: PathBuf) -> Result<Self> {
        log::info!(
            "Connecting to {:?} engine at `{}`",
            kind,
            socket_path.display()
        );
        match kind {
            EngineKind::Docker => DockerProvider::connect(socket_path).await.map(Engine::Docker),
            EngineKind::Containerd => ContainerdProvider::connect(socket_path)
                .await
                .map(Engine::Containerd),
        }
    }
}

impl SnapshotProvider for Engine {
    async fn list_containers(&mut self) -> Result<Vec<ContainerRecord>> {
        match self {
            Engine::Docker(provider) => provider.list_containers().await,
            Engine::Containerd(provider) => provider.list_containers().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_docker_prefix() {
        let record = ContainerRecord::new(
            "abc123",
            vec!["/homepage".to_owned(), "/alias".to_owned()],
            HashMap::new(),
        );
        assert_eq!(record.display_name(), "homepage");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let record = ContainerRecord::new("abc123", Vec::new(), HashMap::new());
        assert_eq!(record.display_name(), "abc123");

        let record = ContainerRecord::new("abc123", vec!["/".to_owned()], HashMap::new());
        assert_eq!(record.display_name(), "abc123");
    }

    #[test]
    fn test_default_sockets() {
        assert_eq!(
            EngineKind::Docker.default_socket(),
            PathBuf::from("/var/run/docker.sock")
        );
        assert_eq!(
            EngineKind::Containerd.default_socket(),
            PathBuf::from("/run/containerd/containerd.sock")
        );
    }
}
