//! Snapshot provider backed by the Docker Engine HTTP API.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use http_body_util::BodyExt;

use super::{ContainerRecord, Error, Result, SnapshotProvider, socket};

pub const DEFAULT_SOCKET: &str = "/var/run/docker.sock";

const PING_PATH: &str = "/_ping";
const CONTAINERS_PATH: &str = "/containers/json";

/// Entry of the `GET /containers/json` response. Unused fields are skipped.
#[derive(Debug, serde::Deserialize)]
struct ContainerSummary {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Names", default)]
    names: Option<Vec<String>>,
    #[serde(rename = "Labels", default)]
    labels: Option<HashMap<String, String>>,
}

impl From<ContainerSummary> for ContainerRecord {
    fn from(summary: ContainerSummary) -> Self {
        ContainerRecord::new(
            summary.id,
            summary.names.unwrap_or_default(),
            summary.labels.unwrap_or_default(),
        )
    }
}

/// Lists running containers through the Docker daemon socket.
///
/// Every request uses a fresh connection, so a restarted daemon is picked up on
/// the next cycle without reconnect logic.
#[derive(Debug, Clone)]
pub struct DockerProvider {
    socket_path: PathBuf,
}

impl DockerProvider {
    /// Creates a provider without probing the daemon.
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Creates a provider and checks that the daemon answers `GET /_ping`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the socket is unreachable or the ping fails.
    pub async fn connect(socket_path: PathBuf) -> Result<Self> {
        let provider = Self::new(socket_path);
        provider.get(PING_PATH).await?;
        log::debug!("Docker daemon at `{}` is up", provider.socket_path.display());
        Ok(provider)
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let io = socket::connect(&self.socket_path)
            .await
            .map_err(|source| Error::SocketConnect {
                path: self.socket_path.clone(),
                source,
            })?;
        let http_err = |source: hyper::Error| Error::Http {
            path: path.to_owned(),
            source,
        };

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(http_err)?;
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                log::debug!("docker connection closed with error: {}", err);
            }
        });

        let request = hyper::Request::builder()
            .method(hyper::Method::GET)
            .uri(path)
            .header(hyper::header::HOST, "docker")
            .body(String::new())
            .map_err(|source| Error::Request {
                path: path.to_owned(),
                source,
            })?;

        let response = sender.send_request(request).await.map_err(http_err)?;
        let status = response.status();

        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(http_err)?
            .to_bytes();

        if !status.is_success() {
            return Err(Error::Status {
                path: path.to_owned(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).trim().to_owned(),
            });
        }

        Ok(bytes.to_vec())
    }
}

impl SnapshotProvider for DockerProvider {
    async fn list_containers(&mut self) -> Result<Vec<ContainerRecord>> {
        let body = self.get(CONTAINERS_PATH).await?;
        let containers = decode_containers(&body)?;
        log::debug!("Found {} running containers", containers.len());
        Ok(containers)
    }
}

/// Decodes a `GET /containers/json` body, keeping the daemon's order.
fn decode_containers(body: &[u8]) -> Result<Vec<ContainerRecord>> {
    let summaries: Vec<ContainerSummary> =
        serde_json::from_slice(body).map_err(|source| Error::Decode {
            path: CONTAINERS_PATH.to_owned(),
            source,
        })?;
    Ok(summaries.into_iter().map(ContainerRecord::from).collect())
}
