//! Method driver trait and the router-backed implementation.
//!
//! `MethodDriver` is the seam between the state machine and the network:
//! the orchestrator only ever asks "is this endpoint usable", "do these
//! credentials work here" and "deploy through this endpoint".

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use mikroclaw_protocol::{DeploymentArtifact, Endpoint, TransportKind};
use mikroclaw_transport::{
    CommandRunner, HttpTransport, RestClient, SshClient, SshTarget, SystemTcp, TcpConnector,
    TransportError,
};
use tracing::debug;

use crate::api::ApiDeployer;
use crate::rest::RestDeployer;
use crate::ssh::SshDeployer;
use crate::types::{Target, Timeouts};

/// Probes, checks and deploys through a single endpoint.
pub trait MethodDriver: Send + Sync {
    /// Detection probe. Never fails; problems read as "not available".
    fn probe(&self, endpoint: Endpoint) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// Authenticated preflight check with a classified failure.
    fn check(
        &self,
        endpoint: Endpoint,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>>;

    /// One deployment attempt.
    fn deploy<'a>(
        &'a self,
        endpoint: Endpoint,
        artifact: &'a DeploymentArtifact,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

/// [`MethodDriver`] that talks to a real router.
///
/// `http` carries the router's REST calls; `downloads` fetches the agent
/// binary for SSH deploys and must verify certificates.
pub struct RouterDriver<'a> {
    target: &'a Target,
    http: &'a dyn HttpTransport,
    downloads: &'a dyn HttpTransport,
    runner: &'a dyn CommandRunner,
    tcp: &'a dyn TcpConnector,
    timeouts: Timeouts,
    scratch_root: Option<PathBuf>,
}

impl<'a> RouterDriver<'a> {
    pub fn new(
        target: &'a Target,
        http: &'a dyn HttpTransport,
        downloads: &'a dyn HttpTransport,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            target,
            http,
            downloads,
            runner,
            tcp: &SystemTcp,
            timeouts: Timeouts::default(),
            scratch_root: None,
        }
    }

    pub fn with_tcp(mut self, tcp: &'a dyn TcpConnector) -> Self {
        self.tcp = tcp;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Parent directory for SSH scratch directories.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn target(&self) -> &Target {
        self.target
    }

    fn ssh_target(&self, port: u16) -> SshTarget<'_> {
        SshTarget {
            host: &self.target.host,
            port,
            credentials: &self.target.credentials,
        }
    }

    fn rest_client(&self, port: u16) -> RestClient<'_> {
        RestClient::new(self.http, &self.target.host, port, &self.target.credentials)
            .with_timeout(self.timeouts.http)
    }

    async fn check_ssh(&self, port: u16) -> Result<(), TransportError> {
        self.tcp
            .reach(&self.target.host, port, self.timeouts.tcp_probe)
            .await?;
        SshClient::new(self.runner)
            .check_auth(&self.ssh_target(port), self.timeouts.ssh_probe)
            .await
    }

    async fn check_api(&self, port: u16) -> Result<(), TransportError> {
        self.tcp
            .reach(&self.target.host, port, self.timeouts.http)
            .await
    }
}

impl MethodDriver for RouterDriver<'_> {
    fn probe(&self, endpoint: Endpoint) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            let host = self.target.host.as_str();
            let ok = match endpoint.kind {
                TransportKind::Ssh => self.check_ssh(endpoint.port).await.is_ok(),
                TransportKind::Rest => self.rest_client(endpoint.port).check_auth().await.is_ok(),
                TransportKind::Api => self
                    .tcp
                    .reach(host, endpoint.port, self.timeouts.tcp_probe)
                    .await
                    .is_ok(),
            };
            debug!(host, %endpoint, ok, "probe");
            ok
        })
    }

    fn check(
        &self,
        endpoint: Endpoint,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>> {
        Box::pin(async move {
            match endpoint.kind {
                TransportKind::Ssh => self.check_ssh(endpoint.port).await,
                TransportKind::Rest => self.rest_client(endpoint.port).check_auth().await,
                TransportKind::Api => self.check_api(endpoint.port).await,
            }
        })
    }

    fn deploy<'b>(
        &'b self,
        endpoint: Endpoint,
        artifact: &'b DeploymentArtifact,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'b>> {
        Box::pin(async move {
            let port = endpoint.port;
            match endpoint.kind {
                TransportKind::Ssh => {
                    let mut deployer =
                        SshDeployer::new(self.runner, self.downloads, self.timeouts);
                    if let Some(root) = &self.scratch_root {
                        deployer = deployer.with_scratch_root(root);
                    }
                    deployer.deploy(self.target, port, artifact).await
                }
                TransportKind::Rest => {
                    RestDeployer::new(self.http, self.timeouts)
                        .deploy(self.target, port, artifact)
                        .await
                }
                TransportKind::Api => {
                    ApiDeployer::new(self.timeouts)
                        .deploy(self.target, port, artifact)
                        .await
                }
            }
        })
    }
}
