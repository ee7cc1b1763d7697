//! RouterOS deploy flow: detect, select, preflight, deploy.
//!
//! This crate holds the **decision logic** of the installer. Network and
//! subprocess access go through `mikroclaw-transport`; the orchestrator
//! itself only sees a [`MethodDriver`], so the whole state machine can be
//! exercised against a mock.
//!
//! # Pipeline
//!
//! 1. **Detect** — probe SSH, REST and binary API candidate ports
//! 2. **Select** — auto-pick a single method, otherwise ask the selector
//! 3. **Preflight** — authenticated check against the chosen endpoint
//! 4. **Deploy** — bounded retries of the method's deployer

pub mod api;
pub mod detect;
pub mod driver;
pub mod error;
pub mod orchestrator;
pub mod rest;
pub mod script;
pub mod selector;
pub mod ssh;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export primary types for convenience.
pub use api::{ApiDeployer, deploy_sentences};
pub use detect::{detect_all, detect_kind};
pub use driver::{MethodDriver, RouterDriver};
pub use error::DeployError;
pub use orchestrator::DeployOrchestrator;
pub use rest::RestDeployer;
pub use selector::{FirstAvailable, MethodSelector, choose};
pub use ssh::SshDeployer;
pub use types::{DeployEvent, DeployState, RetryPolicy, Target, Timeouts};
