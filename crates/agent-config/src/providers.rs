//! LLM provider defaults.

use serde::{Deserialize, Serialize};

/// How the agent presents its API key to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// `Authorization: Bearer <key>`.
    Bearer,
    /// Provider-specific API key header.
    ApiKey,
}

/// Default endpoint settings for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub name: &'static str,
    pub base_url: &'static str,
    pub model: &'static str,
    pub auth_type: AuthType,
}

const fn provider(
    name: &'static str,
    base_url: &'static str,
    model: &'static str,
    auth_type: AuthType,
) -> ProviderDefaults {
    ProviderDefaults {
        name,
        base_url,
        model,
        auth_type,
    }
}

/// Every provider with known defaults. The first entry is the fallback.
pub const PROVIDERS: &[ProviderDefaults] = &[
    provider("openrouter", "https://openrouter.ai/api/v1", "google/gemini-flash", AuthType::Bearer),
    provider("openai", "https://api.openai.com/v1", "gpt-4o", AuthType::Bearer),
    provider("ollama", "http://127.0.0.1:11434/v1", "llama3", AuthType::Bearer),
    provider(
        "anthropic",
        "https://api.anthropic.com/v1",
        "claude-3-5-sonnet-latest",
        AuthType::ApiKey,
    ),
    provider("groq", "https://api.groq.com/openai", "llama3-70b-8192", AuthType::Bearer),
    provider("mistral", "https://api.mistral.ai", "mistral-large-latest", AuthType::Bearer),
    provider("xai", "https://api.x.ai/v1", "grok-beta", AuthType::Bearer),
    provider("deepseek", "https://api.deepseek.com", "deepseek-chat", AuthType::Bearer),
    provider(
        "together",
        "https://api.together.xyz",
        "meta-llama/Llama-3-70b",
        AuthType::Bearer,
    ),
    provider(
        "fireworks",
        "https://api.fireworks.ai/inference",
        "accounts/fireworks/models/llama-v3-70b",
        AuthType::Bearer,
    ),
    provider(
        "perplexity",
        "https://api.perplexity.ai",
        "sonar-medium-online",
        AuthType::Bearer,
    ),
    provider("cohere", "https://api.cohere.com/compatibility", "command-r", AuthType::ApiKey),
    provider(
        "bedrock",
        "https://bedrock-runtime.us-east-1.amazonaws.com",
        "anthropic.claude-3-sonnet",
        AuthType::ApiKey,
    ),
    provider("kimi", "https://api.moonshot.cn/v1", "moonshot-v1-8k", AuthType::Bearer),
    provider("minimax", "https://api.minimax.chat/v1", "abab6.5-chat", AuthType::ApiKey),
    provider("zai", "https://api.z.ai/v1", "zai-latest", AuthType::Bearer),
    provider("synthetic", "https://api.synthetic.new/v1", "synthetic-large", AuthType::Bearer),
    provider("localai", "http://127.0.0.1:11434/v1", "llama3", AuthType::Bearer),
];

/// Providers accepted on the command line and offered in the menu, in
/// menu order. `localai` has defaults but is not offered.
pub const VALID_PROVIDERS: [&str; 17] = [
    "openrouter",
    "openai",
    "anthropic",
    "ollama",
    "groq",
    "mistral",
    "xai",
    "deepseek",
    "together",
    "fireworks",
    "perplexity",
    "cohere",
    "bedrock",
    "kimi",
    "minimax",
    "zai",
    "synthetic",
];

/// Defaults for `name`, or the `openrouter` defaults when unknown.
pub fn defaults_for(name: &str) -> &'static ProviderDefaults {
    PROVIDERS
        .iter()
        .find(|p| p.name == name)
        .unwrap_or(&PROVIDERS[0])
}
