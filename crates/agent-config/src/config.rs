//! The `mikroclaw.env.json` document.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::providers::{AuthType, defaults_for};

/// Per-channel user allowlists: comma-separated IDs, `*` for everyone,
/// empty to deny all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allowlists {
    pub telegram: String,
    pub discord: String,
    pub slack: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    pub provider: Option<String>,
}

/// Agent configuration as read by the agent at startup.
///
/// Field order is the on-disk key order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(rename = "BOT_TOKEN")]
    pub bot_token: String,
    #[serde(rename = "LLM_API_KEY")]
    pub api_key: String,
    #[serde(rename = "LLM_PROVIDER")]
    pub provider: String,
    #[serde(rename = "LLM_BASE_URL")]
    pub base_url: String,
    #[serde(rename = "MODEL")]
    pub model: String,
    #[serde(rename = "AUTH_TYPE")]
    pub auth_type: AuthType,
    #[serde(default)]
    pub allowlists: Allowlists,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl AgentConfig {
    /// Builds a config for `provider`, filling an empty `base_url` or
    /// `model` from the provider defaults.
    ///
    /// Unknown providers use the `openrouter` defaults but keep their name.
    pub fn new(
        bot_token: impl Into<String>,
        api_key: impl Into<String>,
        provider: &str,
        base_url: &str,
        model: &str,
    ) -> Self {
        let defaults = defaults_for(provider);
        if defaults.name != provider {
            tracing::debug!(provider, "no defaults for provider, using openrouter");
        }
        Self {
            bot_token: bot_token.into(),
            api_key: api_key.into(),
            provider: provider.to_string(),
            base_url: non_empty_or(base_url, defaults.base_url),
            model: non_empty_or(model, defaults.model),
            auth_type: defaults.auth_type,
            allowlists: Allowlists::default(),
            memory: MemoryConfig::default(),
        }
    }

    pub fn with_allowlists(mut self, allowlists: Allowlists) -> Self {
        self.allowlists = allowlists;
        self
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("bot_token", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("auth_type", &self.auth_type)
            .field("allowlists", &self.allowlists)
            .field("memory", &self.memory)
            .finish()
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
