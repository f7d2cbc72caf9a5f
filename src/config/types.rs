//! Struct definitions and serde defaults for cocobot configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for cocobot, deserialized from `config.toml`.
///
/// Fields use serde defaults so cocobot can run with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default model identifier (e.g. `"gemini-2.5-flash"`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Default provider name (e.g., "gemini", "anthropic").
    #[serde(default)]
    pub default_provider: Option<String>,
    /// System instruction holding the order script.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Utterance sent on startup to trigger the greeting.
    #[serde(default)]
    pub greeting: Option<String>,
    /// Where confirmed orders are sent.
    #[serde(default)]
    pub orders: OrdersConfig,
}

/// Returns the default model identifier (`"gemini-2.5-flash"`).
///
/// Used by serde's `#[serde(default)]` attribute during deserialization.
pub(super) fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

/// Provider-specific configuration map.
///
/// Each field corresponds to a supported LLM provider. Only providers
/// the user has configured will be `Some`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    pub gemini: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub openai: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
}

/// Connection details for a single LLM provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderEntry {
    /// API key for authentication. Can also be set via environment variables.
    pub api_key: Option<String>,
    /// Custom base URL for the provider's API (only honoured for Ollama).
    pub base_url: Option<String>,
    /// Model identifier to use with this provider.
    pub model: Option<String>,
}

/// Order persistence settings.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OrdersConfig {
    /// Script endpoint receiving the order POST.
    pub endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            provider: ProviderConfig::default(),
            default_provider: None,
            system_prompt: None,
            greeting: None,
            orders: OrdersConfig::default(),
        }
    }
}
