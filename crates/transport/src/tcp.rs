//! Bounded TCP connects.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

use crate::error::TransportError;

/// Opens a TCP connection, failing with `Timeout` after `timeout`.
pub async fn tcp_connect(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<TcpStream, TransportError> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(TransportError::from(e)),
        Err(_) => Err(TransportError::timed_out(
            &format!("connection to {host}:{port}"),
            timeout,
        )),
    }
}

/// Returns `true` if `host:port` accepts a connection within `timeout`.
///
/// Never fails; the connection is dropped immediately.
pub async fn tcp_probe(host: &str, port: u16, timeout: Duration) -> bool {
    match tcp_connect(host, port, timeout).await {
        Ok(_) => {
            debug!(host, port, "port open");
            true
        }
        Err(e) => {
            debug!(host, port, error = %e, "port closed");
            false
        }
    }
}

/// Reachability check behind the SSH preflight and binary API probes.
pub trait TcpConnector: Send + Sync {
    /// Connects to `host:port` and drops the connection.
    fn reach<'a>(
        &'a self,
        host: &'a str,
        port: u16,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;
}

/// [`TcpConnector`] over real sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTcp;

impl TcpConnector for SystemTcp {
    fn reach<'a>(
        &'a self,
        host: &'a str,
        port: u16,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        Box::pin(async move { tcp_connect(host, port, timeout).await.map(drop) })
    }
}
