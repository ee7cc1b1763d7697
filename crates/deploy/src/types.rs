//! Data types for the deploy flow.

use std::fmt;
use std::time::Duration;

use mikroclaw_protocol::constants::{
    CONNECT_TIMEOUT, SSH_PROBE_TIMEOUT, TCP_PROBE_TIMEOUT, TRANSFER_TIMEOUT,
};
use mikroclaw_protocol::{Credentials, Endpoint, FailureCategory};

/// The router being installed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub credentials: Credentials,
}

impl Target {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials,
        }
    }
}

/// Per-operation time bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Bare TCP reachability check.
    pub tcp_probe: Duration,
    /// One `ssh ... ':put "OK"'` run.
    pub ssh_probe: Duration,
    /// HTTP requests against the router, and the binary API connect.
    pub http: Duration,
    /// Binary download, SCP upload and router-side fetch.
    pub transfer: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            tcp_probe: TCP_PROBE_TIMEOUT,
            ssh_probe: SSH_PROBE_TIMEOUT,
            http: CONNECT_TIMEOUT,
            transfer: TRANSFER_TIMEOUT,
        }
    }
}

/// How often detection and deployment are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Detection passes while nothing is found.
    pub detect_passes: u32,
    /// Independent deploy attempts for the selected method.
    pub deploy_attempts: u32,
    /// Pause between retries.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            detect_passes: 2,
            deploy_attempts: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Deployment state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Idle,
    Detecting,
    Selecting,
    Preflight,
    Deploying,
    Succeeded,
    Failed(FailureCategory),
}

impl DeployState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Detecting => f.write_str("detecting"),
            Self::Selecting => f.write_str("selecting"),
            Self::Preflight => f.write_str("preflight"),
            Self::Deploying => f.write_str("deploying"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed(category) => write!(f, "failed({category})"),
        }
    }
}

/// Progress event emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// The state machine moved.
    StateChanged(DeployState),
    /// Detection finished with these methods, in priority order.
    MethodsDetected(Vec<Endpoint>),
    /// The method that will be deployed through.
    MethodSelected(Endpoint),
    /// One deploy attempt returned failure.
    AttemptFailed { attempt: u32, endpoint: Endpoint },
}
