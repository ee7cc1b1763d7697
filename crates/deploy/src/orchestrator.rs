//! Deploy orchestrator.
//!
//! Drives one installation through
//! `Idle → Detecting → Selecting → Preflight → Deploying → Succeeded | Failed`.
//! Every step is awaited before the next begins. Transitions are logged
//! and published on the event channel.

use mikroclaw_protocol::{
    DeploymentArtifact, Endpoint, FailureCategory, TransportKind, UnknownTransport,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::detect::detect_all;
use crate::driver::MethodDriver;
use crate::error::DeployError;
use crate::selector::{MethodSelector, choose};
use crate::types::{DeployEvent, DeployState, RetryPolicy};

/// Orchestrates detection, selection and deployment for one router.
pub struct DeployOrchestrator<'a> {
    driver: &'a dyn MethodDriver,
    selector: &'a dyn MethodSelector,
    policy: RetryPolicy,
    state: DeployState,
    events_tx: mpsc::Sender<DeployEvent>,
    events_rx: Option<mpsc::Receiver<DeployEvent>>,
}

impl<'a> DeployOrchestrator<'a> {
    pub fn new(driver: &'a dyn MethodDriver, selector: &'a dyn MethodSelector) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            driver,
            selector,
            policy: RetryPolicy::default(),
            state: DeployState::Idle,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<DeployEvent>> {
        self.events_rx.take()
    }

    pub fn state(&self) -> DeployState {
        self.state
    }

    /// Full automatic flow: detect, select, preflight, deploy.
    pub async fn run(&mut self, artifact: &DeploymentArtifact) -> Result<Endpoint, DeployError> {
        let methods = self.detect().await;
        let Some(&first) = methods.first() else {
            return Err(self.fail(
                FailureCategory::Connect,
                "no connection methods detected on target".to_string(),
            ));
        };
        self.transition(DeployState::Selecting);
        let endpoint = choose(self.selector, &methods).unwrap_or(first);
        info!(%endpoint, "method selected");
        self.emit(DeployEvent::MethodSelected(endpoint));
        self.deploy_to(endpoint, artifact).await
    }

    /// Deploys through a named method, skipping detection.
    ///
    /// `port` defaults to the kind's standard port. An unknown method name
    /// is an [`DeployError::InvalidArgument`] and touches nothing.
    pub async fn run_with_method(
        &mut self,
        method: &str,
        port: Option<u16>,
        artifact: &DeploymentArtifact,
    ) -> Result<Endpoint, DeployError> {
        let kind: TransportKind = method
            .parse()
            .map_err(|e: UnknownTransport| DeployError::InvalidArgument(e.to_string()))?;
        let endpoint = Endpoint::new(kind, port.unwrap_or_else(|| kind.default_port()));
        info!(%endpoint, "method forced");
        self.emit(DeployEvent::MethodSelected(endpoint));
        self.deploy_to(endpoint, artifact).await
    }

    /// Runs detection, retrying while nothing is found.
    pub async fn detect(&mut self) -> Vec<Endpoint> {
        self.transition(DeployState::Detecting);
        let passes = self.policy.detect_passes.max(1);
        let mut pass = 1;
        let found = loop {
            let found = detect_all(self.driver).await;
            if !found.is_empty() || pass >= passes {
                break found;
            }
            warn!(pass, passes, "no methods detected, retrying");
            pass += 1;
            self.pause().await;
        };
        info!(count = found.len(), "detection finished");
        self.emit(DeployEvent::MethodsDetected(found.clone()));
        found
    }

    /// Preflight check, then up to `deploy_attempts` deploy attempts.
    pub async fn deploy_to(
        &mut self,
        endpoint: Endpoint,
        artifact: &DeploymentArtifact,
    ) -> Result<Endpoint, DeployError> {
        self.transition(DeployState::Preflight);
        if let Err(e) = self.driver.check(endpoint).await {
            return Err(self.fail(e.category(), format!("{endpoint}: {}", e.detail())));
        }

        self.transition(DeployState::Deploying);
        let attempts = self.policy.deploy_attempts.max(1);
        for attempt in 1..=attempts {
            if self.driver.deploy(endpoint, artifact).await {
                info!(%endpoint, attempt, "deploy succeeded");
                self.transition(DeployState::Succeeded);
                return Ok(endpoint);
            }
            warn!(%endpoint, attempt, attempts, "deploy attempt failed");
            self.emit(DeployEvent::AttemptFailed { attempt, endpoint });
            if attempt < attempts {
                self.pause().await;
            }
        }
        Err(self.fail(
            FailureCategory::Connect,
            format!("deployment failed via {endpoint}"),
        ))
    }

    fn transition(&mut self, state: DeployState) {
        info!(from = %self.state, to = %state, "deploy state");
        self.state = state;
        self.emit(DeployEvent::StateChanged(state));
    }

    fn emit(&self, event: DeployEvent) {
        // Never blocks; events are dropped when the receiver is full or gone.
        let _ = self.events_tx.try_send(event);
    }

    fn fail(&mut self, category: FailureCategory, detail: String) -> DeployError {
        error!(%category, %detail, "deploy failed");
        self.transition(DeployState::Failed(category));
        DeployError::failed(category, detail)
    }

    async fn pause(&self) {
        let delay = self.policy.retry_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
