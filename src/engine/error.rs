use std::path::PathBuf;

/// Failures talking to the container engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to socket `{path}`: {source}")]
    SocketConnect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open grpc channel on socket `{path}`: {source}")]
    ChannelConnect {
        path: PathBuf,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("failed to build request for `{path}`: {source}")]
    Request {
        path: String,
        #[source]
        source: hyper::http::Error,
    },
    #[error("http exchange for `{path}` failed: {source}")]
    Http {
        path: String,
        #[source]
        source: hyper::Error,
    },
    #[error("engine answered `{path}` with status {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response of `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("grpc channel not ready: {0}")]
    NotReady(#[source] tonic::transport::Error),
    #[error("grpc call `{method}` failed: {source}")]
    Grpc {
        method: &'static str,
        #[source]
        source: Box<tonic::Status>,
    },
    #[error("invalid namespace `{namespace}`: {source}")]
    InvalidNamespace {
        namespace: String,
        #[source]
        source: tonic::metadata::errors::InvalidMetadataValue,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
