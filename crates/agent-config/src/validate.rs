//! Input validation for installer arguments.

use std::net::Ipv4Addr;

use crate::error::ConfigError;
use crate::providers::VALID_PROVIDERS;

/// Router user names: non-empty, `[A-Za-z0-9._-]` only.
pub fn is_valid_user(user: &str) -> bool {
    !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

pub fn is_valid_ipv4(ip: &str) -> bool {
    ip.parse::<Ipv4Addr>().is_ok()
}

/// Whether `provider` may be chosen on the command line.
pub fn is_valid_provider(provider: &str) -> bool {
    VALID_PROVIDERS.contains(&provider)
}

pub fn check_user(user: &str) -> Result<(), ConfigError> {
    if is_valid_user(user) {
        Ok(())
    } else {
        Err(ConfigError::InvalidUser(user.to_string()))
    }
}

pub fn check_ipv4(ip: &str) -> Result<(), ConfigError> {
    if is_valid_ipv4(ip) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIp(ip.to_string()))
    }
}

pub fn check_provider(provider: &str) -> Result<(), ConfigError> {
    if is_valid_provider(provider) {
        Ok(())
    } else {
        Err(ConfigError::UnknownProvider(provider.to_string()))
    }
}
