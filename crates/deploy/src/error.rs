//! Deploy error types.

use mikroclaw_protocol::FailureCategory;
use mikroclaw_transport::TransportError;

/// Errors returned by the deploy orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    /// Caller input that no transport could act on, such as an unknown
    /// method name. Never a transport failure.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{detail}")]
    Failed {
        category: FailureCategory,
        detail: String,
    },
}

impl DeployError {
    pub fn failed(category: FailureCategory, detail: impl Into<String>) -> Self {
        Self::Failed {
            category,
            detail: detail.into(),
        }
    }

    /// Failure category, or `None` for invalid arguments.
    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::Failed { category, .. } => Some(*category),
        }
    }
}

impl From<TransportError> for DeployError {
    fn from(err: TransportError) -> Self {
        Self::failed(err.category(), err.detail())
    }
}
