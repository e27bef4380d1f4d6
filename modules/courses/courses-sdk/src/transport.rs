//! gRPC client transport configuration and connection utilities.
//!
//! Supports two endpoint forms:
//! - `http://host:port` over TCP
//! - `unix:///path/to/socket` over a Unix domain socket (unix only)

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::Instrument;

/// Authority used for UDS channels; the connector ignores it.
#[cfg(unix)]
const UDS_PLACEHOLDER_URI: &str = "http://[::]:50051";

/// Configuration for the client transport stack.
#[derive(Debug, Clone)]
pub struct GrpcClientConfig {
    /// Timeout for establishing the initial connection.
    pub connect_timeout: Duration,

    /// Timeout for individual RPC calls.
    pub rpc_timeout: Duration,

    /// Service name for tracing.
    pub service_name: &'static str,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(30),
            service_name: "grpc_client",
        }
    }
}

impl GrpcClientConfig {
    /// Create a new configuration with the given service name.
    #[must_use]
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the RPC timeout.
    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }
}

fn build_endpoint(uri: String, cfg: &GrpcClientConfig) -> Result<Endpoint, tonic::transport::Error> {
    let endpoint = Endpoint::from_shared(uri)?
        .connect_timeout(cfg.connect_timeout)
        .timeout(cfg.rpc_timeout)
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);

    Ok(endpoint)
}

/// Open a channel to `uri`, dispatching on its scheme.
///
/// # Errors
/// Returns an error if the URI is malformed, the scheme is unsupported on this
/// platform, or the connection cannot be established.
pub async fn connect_channel(uri: &str, cfg: &GrpcClientConfig) -> anyhow::Result<Channel> {
    let span = tracing::debug_span!("grpc_connect", service = cfg.service_name, uri = %uri);

    async move {
        let channel = match uri.strip_prefix("unix://") {
            Some(path) => connect_uds(path, cfg).await?,
            None => build_endpoint(uri.to_owned(), cfg)?.connect().await?,
        };
        tracing::debug!(service_name = cfg.service_name, "gRPC client connected");
        Ok(channel)
    }
    .instrument(span)
    .await
}

#[cfg(unix)]
async fn connect_uds(path: &str, cfg: &GrpcClientConfig) -> anyhow::Result<Channel> {
    use hyper_util::rt::TokioIo;
    use tokio::net::UnixStream;
    use tonic::transport::Uri;
    use tower::service_fn;

    let path = std::path::PathBuf::from(path);
    let channel = build_endpoint(UDS_PLACEHOLDER_URI.to_owned(), cfg)?
        .connect_with_connector(service_fn(move |_: Uri| {
            let path = path.clone();
            async move { Ok::<_, std::io::Error>(TokioIo::new(UnixStream::connect(path).await?)) }
        }))
        .await?;
    Ok(channel)
}

#[cfg(not(unix))]
async fn connect_uds(path: &str, _cfg: &GrpcClientConfig) -> anyhow::Result<Channel> {
    anyhow::bail!("unix socket endpoints are not supported on this platform: '{path}'")
}
