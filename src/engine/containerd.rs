//! Snapshot provider backed by the containerd gRPC API.
//!
//! Containers are collected across all namespaces: list namespaces, then per
//! namespace list tasks (to know which containers are running) and containers
//! (for their labels).
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::Channel;

use super::{ContainerRecord, Error, Result, SnapshotProvider, socket};

pub const DEFAULT_SOCKET: &str = "/run/containerd/containerd.sock";

const NAMESPACE_HEADER: &str = "containerd-namespace";

const LIST_NAMESPACES: &str = "/containerd.services.namespaces.v1.Namespaces/List";
const LIST_TASKS: &str = "/containerd.services.tasks.v1.Tasks/List";
const LIST_CONTAINERS: &str = "/containerd.services.containers.v1.Containers/List";

/// Subset of the containerd API messages needed to build a snapshot.
///
/// Field tags follow containerd's `api/` protobuf definitions; fields not
/// declared here are skipped when decoding.
pub mod api {
    use std::collections::HashMap;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListNamespacesRequest {
        #[prost(string, tag = "1")]
        pub filter: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListNamespacesResponse {
        #[prost(message, repeated, tag = "1")]
        pub namespaces: Vec<Namespace>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Namespace {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(map = "string, string", tag = "2")]
        pub labels: HashMap<String, String>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListTasksRequest {
        #[prost(string, tag = "1")]
        pub filter: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListTasksResponse {
        #[prost(message, repeated, tag = "1")]
        pub tasks: Vec<Process>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Process {
        #[prost(string, tag = "1")]
        pub container_id: String,
        #[prost(string, tag = "2")]
        pub id: String,
        #[prost(uint32, tag = "3")]
        pub pid: u32,
        #[prost(enumeration = "Status", tag = "4")]
        pub status: i32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Status {
        Unknown = 0,
        Created = 1,
        Running = 2,
        Stopped = 3,
        Paused = 4,
        Pausing = 5,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListContainersRequest {
        #[prost(string, repeated, tag = "1")]
        pub filters: Vec<String>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListContainersResponse {
        #[prost(message, repeated, tag = "1")]
        pub containers: Vec<Container>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Container {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(map = "string, string", tag = "2")]
        pub labels: HashMap<String, String>,
        #[prost(string, tag = "3")]
        pub image: String,
    }
}

/// Lists running containers of every containerd namespace.
#[derive(Debug, Clone)]
pub struct ContainerdProvider {
    socket_path: PathBuf,
    channel: Channel,
}

impl ContainerdProvider {
    /// Opens a channel on the containerd socket and checks that the namespace
    /// service answers.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the channel cannot be created or the initial request fails.
    pub async fn connect(socket_path: PathBuf) -> Result<Self> {
        let channel = socket::grpc_channel(&socket_path)
            .await
            .map_err(|source| Error::ChannelConnect {
                path: socket_path.clone(),
                source,
            })?;
        let provider = Self {
            socket_path,
            channel,
        };
        let namespaces = provider.namespaces().await?;
        log::debug!(
            "containerd at `{}` serves {} namespaces",
            provider.socket_path.display(),
            namespaces.len()
        );
        Ok(provider)
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    async fn namespaces(&self) -> Result<Vec<String>> {
        let response: api::ListNamespacesResponse = unary(
            self.channel.clone(),
            LIST_NAMESPACES,
            None,
            api::ListNamespacesRequest::default(),
        )
        .await?;
        Ok(response
            .namespaces
            .into_iter()
            .map(|namespace| namespace.name)
            .collect())
    }

    async fn namespace_snapshot(&self, namespace: &str) -> Result<Vec<ContainerRecord>> {
        let header =
            MetadataValue::from_str(namespace).map_err(|source| Error::InvalidNamespace {
                namespace: namespace.to_owned(),
                source,
            })?;

        let tasks: api::ListTasksResponse = unary(
            self.channel.clone(),
            LIST_TASKS,
            Some(&header),
            api::ListTasksRequest::default(),
        )
        .await?;
        let running = running_container_ids(&tasks.tasks);

        let containers: api::ListContainersResponse = unary(
            self.channel.clone(),
            LIST_CONTAINERS,
            Some(&header),
            api::ListContainersRequest::default(),
        )
        .await?;
        log::debug!(
            "Found {} containers ({} running) in namespace `{}`",
            containers.containers.len(),
            running.len(),
            namespace
        );

        Ok(containers
            .containers
            .into_iter()
            .filter(|container| running.contains(container.id.as_str()))
            .map(|container| {
                let names = vec![container.id.clone()];
                ContainerRecord::new(container.id, names, container.labels)
            })
            .collect())
    }
}

impl SnapshotProvider for ContainerdProvider {
    async fn list_containers(&mut self) -> Result<Vec<ContainerRecord>> {
        let mut snapshot = Vec::new();
        for namespace in self.namespaces().await? {
            log::debug!("Requesting running containers for namespace `{}`", namespace);
            snapshot.extend(self.namespace_snapshot(&namespace).await?);
        }
        Ok(snapshot)
    }
}

/// Ids of containers whose init task is running.
fn running_container_ids(tasks: &[api::Process]) -> HashSet<&str> {
    tasks
        .iter()
        .filter(|task| task.status == api::Status::Running as i32)
        .flat_map(|task| [task.container_id.as_str(), task.id.as_str()])
        .filter(|id| !id.is_empty())
        .collect()
}

async fn unary<Req, Resp>(
    channel: Channel,
    method: &'static str,
    namespace: Option<&MetadataValue<Ascii>>,
    message: Req,
) -> Result<Resp>
where
    Req: prost::Message + Send + Sync + 'static,
    Resp: prost::Message + Default + Send + Sync + 'static,
{
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready().await.map_err(Error::NotReady)?;

    let mut request = tonic::Request::new(message);
    if let Some(namespace) = namespace {
        request
            .metadata_mut()
            .insert(NAMESPACE_HEADER, namespace.clone());
    }

    let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
    let path = tonic::codegen::http::uri::PathAndQuery::from_static(method);
    let response = grpc
        .unary(request, path, codec)
        .await
        .map_err(|status| Error::Grpc {
            method,
            source: Box::new(status),
        })?;

    Ok(response.into_inner())
}
