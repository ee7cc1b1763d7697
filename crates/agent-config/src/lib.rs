//! MikroClaw agent configuration.
//!
//! Builds the `mikroclaw.env.json` document deployed next to the agent
//! binary, from a provider name and a handful of user inputs. Missing
//! values are filled from the provider defaults table.

pub mod config;
pub mod error;
pub mod providers;
pub mod validate;

// Re-export primary types for convenience.
pub use config::{AgentConfig, Allowlists, MemoryConfig};
pub use error::ConfigError;
pub use providers::{AuthType, PROVIDERS, ProviderDefaults, VALID_PROVIDERS, defaults_for};
pub use validate::{
    check_ipv4, check_provider, check_user, is_valid_ipv4, is_valid_provider, is_valid_user,
};
