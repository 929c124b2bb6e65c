use std::path::{Path, PathBuf};
use std::{pin, task};

use hyper_util::rt::TokioIo;
use tonic::transport::{Channel, Endpoint};

/// Opens a raw connection to the engine socket, ready for a hyper handshake.
pub(super) async fn connect(path: &Path) -> std::io::Result<TokioIo<tokio::net::UnixStream>> {
    log::trace!("Connecting to {}...", path.display());
    let stream = tokio::net::UnixStream::connect(path).await?;
    Ok(TokioIo::new(stream))
}

#[derive(Debug, Clone)]
struct UnixConnector {
    path: PathBuf,
}

impl tower::Service<hyper::Uri> for UnixConnector {
    type Response = TokioIo<tokio::net::UnixStream>;

    type Error = std::io::Error;

    type Future = pin::Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut task::Context<'_>) -> task::Poll<Result<(), Self::Error>> {
        task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: hyper::Uri) -> Self::Future {
        let path = self.path.clone();
        Box::pin(async move { connect(&path).await })
    }
}

/// Creates a gRPC channel whose connections are dialed on the unix socket at `path`.
///
/// The endpoint URI is a placeholder; tonic requires one but it is never resolved.
pub(super) async fn grpc_channel(path: &Path) -> Result<Channel, tonic::transport::Error> {
    let connector = UnixConnector {
        path: path.to_path_buf(),
    };
    let channel = Endpoint::from_static("http://[::]:50051")
        .connect_with_connector(connector)
        .await?;
    log::debug!("Created grpc channel for {}.", path.display());

    Ok(channel)
}
