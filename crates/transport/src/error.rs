//! Transport error taxonomy.
//!
//! Every failure is one of three kinds. The classifiers below are the only
//! places that decide which, so the same underlying condition maps to the
//! same category whether it came from SSH, REST or the binary API.

use std::io;
use std::time::Duration;

use mikroclaw_protocol::FailureCategory;

/// A transport operation did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Connect(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Timeout(String),
}

impl TransportError {
    /// The category reported to the user.
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Connect(_) => FailureCategory::Connect,
            Self::Auth(_) => FailureCategory::Auth,
            Self::Timeout(_) => FailureCategory::Timeout,
        }
    }

    /// Short human-readable detail.
    pub fn detail(&self) -> &str {
        match self {
            Self::Connect(d) | Self::Auth(d) | Self::Timeout(d) => d,
        }
    }

    /// Timeout for `what` after `after`.
    pub fn timed_out(what: &str, after: Duration) -> Self {
        Self::Timeout(format!("{what} timed out after {}s", after.as_secs_f32()))
    }

    /// Classifies an I/O error.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Self::Timeout("operation timed out".into())
            }
            io::ErrorKind::ConnectionRefused => {
                Self::Connect("connection refused; service may not be enabled".into())
            }
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => Self::Connect(
                "network unreachable; verify router IP and routing".into(),
            ),
            _ => Self::Connect(format!("connection failed: {err}")),
        }
    }

    /// Classifies free text, typically subprocess stderr.
    pub fn from_message(message: &str) -> Self {
        let lowered = message.to_ascii_lowercase();
        let detail = first_line(message);
        if ["auth", "unauthorized", "permission", "denied"]
            .iter()
            .any(|needle| lowered.contains(needle))
        {
            Self::Auth(detail)
        } else if lowered.contains("timed out") || lowered.contains("timeout") {
            Self::Timeout(detail)
        } else {
            Self::Connect(detail)
        }
    }

    /// Rejected credentials on an HTTP endpoint.
    pub fn http_auth() -> Self {
        Self::Auth("authentication failed; verify router username/password".into())
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::from_io(&err)
    }
}

fn first_line(message: &str) -> String {
    let line = message.lines().map(str::trim).find(|l| !l.is_empty());
    match line {
        Some(l) => l.to_string(),
        None => "operation failed".to_string(),
    }
}
