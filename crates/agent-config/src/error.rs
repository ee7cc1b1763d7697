/// Errors building or validating agent configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid router user '{0}' (allowed: letters, digits, '.', '_', '-')")]
    InvalidUser(String),

    #[error("invalid IPv4 address '{0}'")]
    InvalidIp(String),

    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
