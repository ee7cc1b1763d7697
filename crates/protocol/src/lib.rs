//! Shared data model for the MikroClaw RouterOS installer.
//!
//! Every other crate in the workspace speaks in these types: which
//! management surface a router exposes ([`TransportKind`]), where it was
//! found ([`Endpoint`]), who we log in as ([`Credentials`]) and how a
//! failure is reported to the user ([`FailureCategory`]).

pub mod constants;
pub mod types;

// Re-export primary types for convenience.
pub use types::{
    Credentials, DeploymentArtifact, Endpoint, FailureCategory, TransportKind, UnknownTransport,
};
