//! gRPC server hosting the courses service.
//!
//! Binding and serving are separate steps so callers learn the bound
//! endpoint (ephemeral TCP port, socket path) before requests are accepted.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::transport::server::Router;

use courses_sdk::{CoursesServiceServer, SERVICE_NAME};

use crate::api::grpc::CoursesServiceImpl;
use crate::domain::CourseStore;

/// Where the server listens.
///
/// Parsed from:
/// - TCP: `"127.0.0.1:50051"` or `"0.0.0.0:0"` for an ephemeral port
/// - Unix Domain Socket (Unix only): `"uds:///path/to/socket.sock"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenConfig {
    Tcp(SocketAddr),
    #[cfg(unix)]
    Uds(PathBuf),
}

impl FromStr for ListenConfig {
    type Err = anyhow::Error;

    fn from_str(listen_addr: &str) -> Result<Self, Self::Err> {
        if let Some(uds_path) = listen_addr.strip_prefix("uds://") {
            return Self::uds(uds_path);
        }

        let addr = listen_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid listen_addr '{listen_addr}'"))?;
        Ok(Self::Tcp(addr))
    }
}

impl ListenConfig {
    #[cfg(unix)]
    fn uds(path: &str) -> anyhow::Result<Self> {
        if path.is_empty() {
            anyhow::bail!("UDS listen_addr has an empty path");
        }
        Ok(Self::Uds(PathBuf::from(path)))
    }

    #[cfg(not(unix))]
    fn uds(path: &str) -> anyhow::Result<Self> {
        anyhow::bail!("UDS listen_addr is not supported on this platform: '{path}'")
    }
}

/// The address a server actually bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundEndpoint {
    Tcp(SocketAddr),
    #[cfg(unix)]
    Uds(PathBuf),
}

impl BoundEndpoint {
    /// URI a [`courses_sdk::CoursesGrpcClient`] can connect to.
    #[must_use]
    pub fn uri(&self) -> String {
        match self {
            Self::Tcp(addr) => format!("http://{addr}"),
            #[cfg(unix)]
            Self::Uds(path) => format!("unix://{}", path.display()),
        }
    }

    /// Network name used in the plugin handshake.
    #[must_use]
    pub fn network(&self) -> &'static str {
        match self {
            Self::Tcp(_) => "tcp",
            #[cfg(unix)]
            Self::Uds(_) => "unix",
        }
    }

    /// The line announcing this endpoint to the router, e.g. `1|1|unix|/tmp/courses.sock|grpc`.
    #[must_use]
    pub fn handshake_line(&self, handshake: Handshake) -> String {
        format!(
            "{}|{}|{}|{self}|grpc",
            handshake.core_protocol_version,
            handshake.app_protocol_version,
            self.network()
        )
    }
}

impl fmt::Display for BoundEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "{addr}"),
            #[cfg(unix)]
            Self::Uds(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Protocol versions announced in the plugin handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handshake {
    pub core_protocol_version: u32,
    pub app_protocol_version: u32,
}

impl Default for Handshake {
    fn default() -> Self {
        Self {
            core_protocol_version: 1,
            app_protocol_version: 1,
        }
    }
}

/// Unbound server: the store to expose and where to listen.
pub struct GrpcServer {
    store: Arc<CourseStore>,
    listen: ListenConfig,
    health: bool,
}

impl GrpcServer {
    #[must_use]
    pub fn new(store: Arc<CourseStore>, listen: ListenConfig) -> Self {
        Self {
            store,
            listen,
            health: true,
        }
    }

    /// Toggle the standard `grpc.health.v1.Health` service.
    #[must_use]
    pub fn with_health(mut self, enabled: bool) -> Self {
        self.health = enabled;
        self
    }

    /// Bind the listener.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound.
    pub async fn bind(self) -> anyhow::Result<BoundServer> {
        let (incoming, endpoint) = match self.listen {
            ListenConfig::Tcp(addr) => {
                let listener = TcpListener::bind(addr)
                    .await
                    .with_context(|| format!("failed to bind TCP listener at '{addr}'"))?;
                let bound_addr = listener.local_addr()?;
                tracing::info!(%bound_addr, transport = "tcp", "gRPC server listening");
                (Incoming::Tcp(listener), BoundEndpoint::Tcp(bound_addr))
            }
            #[cfg(unix)]
            ListenConfig::Uds(path) => {
                use tokio::net::UnixListener;

                prepare_uds_socket_path(&path);
                let listener = UnixListener::bind(&path).with_context(|| {
                    format!("failed to bind UDS listener at '{}'", path.display())
                })?;
                tracing::info!(path = %path.display(), transport = "uds", "gRPC server listening");
                (Incoming::Uds(listener), BoundEndpoint::Uds(path))
            }
        };

        Ok(BoundServer {
            store: self.store,
            health: self.health,
            incoming,
            endpoint,
        })
    }
}

enum Incoming {
    Tcp(TcpListener),
    #[cfg(unix)]
    Uds(tokio::net::UnixListener),
}

/// A server whose listener is bound but not yet accepting requests.
pub struct BoundServer {
    store: Arc<CourseStore>,
    health: bool,
    incoming: Incoming,
    endpoint: BoundEndpoint,
}

impl BoundServer {
    #[must_use]
    pub fn endpoint(&self) -> &BoundEndpoint {
        &self.endpoint
    }

    async fn router(&self) -> Router {
        let courses = CoursesServiceServer::new(CoursesServiceImpl::new(Arc::clone(&self.store)));

        let health = if self.health {
            let (reporter, service) = tonic_health::server::health_reporter();
            reporter
                .set_serving::<CoursesServiceServer<CoursesServiceImpl>>()
                .await;
            tracing::info!("gRPC health service (grpc.health.v1) enabled");
            Some(service)
        } else {
            None
        };

        Server::builder()
            .add_service(courses)
            .add_optional_service(health)
    }

    /// Accept requests until `cancel` fires, then drain and return.
    ///
    /// # Errors
    /// Returns an error if the transport fails while serving.
    pub async fn serve(self, cancel: CancellationToken) -> anyhow::Result<()> {
        let router = self.router().await;
        tracing::info!(service = SERVICE_NAME, endpoint = %self.endpoint, "serving");

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("gRPC server shutting down");
        };

        match self.incoming {
            Incoming::Tcp(listener) => {
                router
                    .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
                    .await?;
            }
            #[cfg(unix)]
            Incoming::Uds(listener) => {
                use tokio_stream::wrappers::UnixListenerStream;

                let result = router
                    .serve_with_incoming_shutdown(UnixListenerStream::new(listener), shutdown)
                    .await;
                if let BoundEndpoint::Uds(path) = &self.endpoint {
                    prepare_uds_socket_path(path);
                }
                result?;
            }
        }
        Ok(())
    }
}

/// Remove a stale socket file so the path can be (re)bound.
#[cfg(unix)]
fn prepare_uds_socket_path(path: &std::path::Path) {
    use std::io;

    if !path.exists() {
        return;
    }

    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed existing UDS socket file");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to remove existing UDS socket file"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_tcp_listen_addr() {
        assert_eq!(
            "127.0.0.1:50051".parse::<ListenConfig>().unwrap(),
            ListenConfig::Tcp("127.0.0.1:50051".parse().unwrap())
        );
    }

    #[test]
    #[cfg(unix)]
    fn parses_uds_listen_addr() {
        assert_eq!(
            "uds:///tmp/courses.sock".parse::<ListenConfig>().unwrap(),
            ListenConfig::Uds(PathBuf::from("/tmp/courses.sock"))
        );
        assert!("uds://".parse::<ListenConfig>().is_err());
    }

    #[test]
    fn rejects_non_socket_addresses() {
        assert!(r"pipe://\\.\pipe\courses".parse::<ListenConfig>().is_err());
        assert!("localhost".parse::<ListenConfig>().is_err());
    }

    #[test]
    fn tcp_handshake_line() {
        let endpoint = BoundEndpoint::Tcp("127.0.0.1:4000".parse().unwrap());
        assert_eq!(endpoint.uri(), "http://127.0.0.1:4000");
        assert_eq!(
            endpoint.handshake_line(Handshake::default()),
            "1|1|tcp|127.0.0.1:4000|grpc"
        );
    }

    #[test]
    #[cfg(unix)]
    fn uds_handshake_line() {
        let endpoint = BoundEndpoint::Uds(PathBuf::from("/tmp/plugin-1.sock"));
        assert_eq!(endpoint.uri(), "unix:///tmp/plugin-1.sock");
        let handshake = Handshake {
            core_protocol_version: 1,
            app_protocol_version: 2,
        };
        assert_eq!(
            endpoint.handshake_line(handshake),
            "1|2|unix|/tmp/plugin-1.sock|grpc"
        );
    }

    #[tokio::test]
    async fn bind_reports_ephemeral_port() {
        let server = GrpcServer::new(
            Arc::new(CourseStore::new()),
            ListenConfig::Tcp("127.0.0.1:0".parse().unwrap()),
        );
        let bound = server.bind().await.unwrap();
        match bound.endpoint() {
            BoundEndpoint::Tcp(addr) => assert_ne!(addr.port(), 0),
            #[cfg(unix)]
            BoundEndpoint::Uds(_) => panic!("expected TCP endpoint"),
        }
    }
}
