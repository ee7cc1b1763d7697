//! One router install session: shared transports plus retry settings.
//!
//! Every call builds a fresh driver and orchestrator for the given target,
//! so credentials can change between calls in interactive mode.

use mikroclaw_deploy::{
    DeployError, DeployOrchestrator, FirstAvailable, RetryPolicy, RouterDriver, Target, Timeouts,
};
use mikroclaw_protocol::{DeploymentArtifact, Endpoint};
use mikroclaw_transport::{
    CommandRunner, HttpTransport, ReqwestTransport, SystemTcp, TcpConnector, TransportError,
};
use tokio::task::JoinHandle;

use crate::progress::print_events;

/// HTTP clients for a live run: router REST calls first, then agent
/// downloads. Only the first skips certificate checks.
pub fn live_clients() -> Result<(ReqwestTransport, ReqwestTransport), TransportError> {
    Ok((ReqwestTransport::router()?, ReqwestTransport::verified()?))
}

pub struct Session<'a> {
    /// Router REST calls.
    http: &'a dyn HttpTransport,
    /// Agent binary downloads.
    downloads: &'a dyn HttpTransport,
    runner: &'a dyn CommandRunner,
    tcp: &'a dyn TcpConnector,
    timeouts: Timeouts,
    policy: RetryPolicy,
}

impl<'a> Session<'a> {
    pub fn new(
        http: &'a dyn HttpTransport,
        downloads: &'a dyn HttpTransport,
        runner: &'a dyn CommandRunner,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            http,
            downloads,
            runner,
            tcp: &SystemTcp,
            timeouts: Timeouts::default(),
            policy,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_tcp(mut self, tcp: &'a dyn TcpConnector) -> Self {
        self.tcp = tcp;
        self
    }

    pub fn downloads(&self) -> &'a dyn HttpTransport {
        self.downloads
    }

    fn driver<'t>(&'t self, target: &'t Target) -> RouterDriver<'t> {
        RouterDriver::new(target, self.http, self.downloads, self.runner)
            .with_tcp(self.tcp)
            .with_timeouts(self.timeouts)
    }

    /// Detection only, with the policy's retry passes.
    pub async fn detect(&self, target: &Target) -> Vec<Endpoint> {
        let driver = self.driver(target);
        let mut orchestrator = DeployOrchestrator::new(&driver, &FirstAvailable)
            .with_policy(self.policy);
        let printer = watch(&mut orchestrator);
        let found = orchestrator.detect().await;
        drop(orchestrator);
        finish(printer).await;
        found
    }

    /// Preflight and deploy through an endpoint the user already chose.
    pub async fn deploy(
        &self,
        target: &Target,
        endpoint: Endpoint,
        artifact: &DeploymentArtifact,
    ) -> Result<Endpoint, DeployError> {
        let driver = self.driver(target);
        let mut orchestrator = DeployOrchestrator::new(&driver, &FirstAvailable)
            .with_policy(self.policy);
        let printer = watch(&mut orchestrator);
        let result = orchestrator.deploy_to(endpoint, artifact).await;
        drop(orchestrator);
        finish(printer).await;
        result
    }

    /// Unattended install: a forced `(method, port)` or full auto-detection
    /// taking the highest-priority method.
    pub async fn install(
        &self,
        target: &Target,
        forced: Option<(&str, Option<u16>)>,
        artifact: &DeploymentArtifact,
    ) -> Result<Endpoint, DeployError> {
        let driver = self.driver(target);
        let mut orchestrator = DeployOrchestrator::new(&driver, &FirstAvailable)
            .with_policy(self.policy);
        let printer = watch(&mut orchestrator);
        let result = match forced {
            Some((method, port)) => orchestrator.run_with_method(method, port, artifact).await,
            None => orchestrator.run(artifact).await,
        };
        drop(orchestrator);
        finish(printer).await;
        result
    }
}

fn watch(orchestrator: &mut DeployOrchestrator<'_>) -> Option<JoinHandle<()>> {
    orchestrator.take_events().map(|rx| tokio::spawn(print_events(rx)))
}

async fn finish(printer: Option<JoinHandle<()>>) {
    if let Some(handle) = printer {
        let _ = handle.await;
    }
}
