//! Environment variable substitution and value resolution.

use super::types::{Config, ProviderEntry};

use crate::constants::{
    DEFAULT_ORDER_ENDPOINT, DEFAULT_SYSTEM_PROMPT, GENERIC_API_KEY_VAR, OPENING_UTTERANCE,
};

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.model = resolve_str(&self.model);
        for field in [
            &mut self.system_prompt,
            &mut self.default_provider,
            &mut self.greeting,
            &mut self.orders.endpoint,
        ] {
            if let Some(value) = field {
                *value = resolve_str(value);
            }
        }
        for entry in [
            &mut self.provider.gemini,
            &mut self.provider.anthropic,
            &mut self.provider.openai,
            &mut self.provider.openrouter,
            &mut self.provider.ollama,
        ] {
            resolve_provider_entry(entry);
        }
    }

    fn provider_entry(&self, provider: &str) -> Option<&ProviderEntry> {
        match provider {
            "gemini" => self.provider.gemini.as_ref(),
            "anthropic" => self.provider.anthropic.as_ref(),
            "openai" => self.provider.openai.as_ref(),
            "openrouter" => self.provider.openrouter.as_ref(),
            "ollama" => self.provider.ollama.as_ref(),
            _ => None,
        }
    }

    /// Resolve API key for a provider: provider env var, then config value,
    /// then the generic `API_KEY` variable. Empty values count as missing.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        let env_key = format!("{}_API_KEY", provider.to_uppercase());
        pick_api_key(
            std::env::var(&env_key).ok(),
            self.provider_entry(provider)
                .and_then(|e| e.api_key.as_deref()),
            std::env::var(GENERIC_API_KEY_VAR).ok(),
        )
    }

    /// Get the configured default provider name, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref().filter(|p| !p.is_empty())
    }

    /// Get the model name from config, stripping provider prefix if present.
    /// Returns None if the model is the compile-time default (meaning user hasn't configured it).
    pub fn model_name(&self) -> Option<String> {
        let m = &self.model;
        if m.is_empty() || m == crate::constants::DEFAULT_MODEL {
            return None;
        }
        if let Some((_prov, model)) = m.split_once('/') {
            Some(model.to_string())
        } else {
            Some(m.to_string())
        }
    }

    /// Model configured under `[provider.<name>]`, if any.
    pub fn provider_model(&self, provider: &str) -> Option<String> {
        self.provider_entry(provider)
            .and_then(|e| e.model.clone())
            .filter(|m| !m.is_empty())
    }

    /// System instruction sent with every request.
    pub fn system_instruction(&self) -> &str {
        non_empty(self.system_prompt.as_deref()).unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Utterance sent on startup to trigger the scripted greeting.
    pub fn opening_utterance(&self) -> &str {
        non_empty(self.greeting.as_deref()).unwrap_or(OPENING_UTTERANCE)
    }

    /// Endpoint receiving confirmed orders.
    pub fn order_endpoint(&self) -> &str {
        non_empty(self.orders.endpoint.as_deref()).unwrap_or(DEFAULT_ORDER_ENDPOINT)
    }

    /// Copy of this config with every API key replaced by `***`, for display.
    pub fn masked(&self) -> Config {
        let mut config = self.clone();
        for entry in [
            &mut config.provider.gemini,
            &mut config.provider.anthropic,
            &mut config.provider.openai,
            &mut config.provider.openrouter,
            &mut config.provider.ollama,
        ]
        .into_iter()
        .flatten()
        {
            if entry.api_key.is_some() {
                entry.api_key = Some("***".to_string());
            }
        }
        config
    }
}

/// Resolves `{env:VAR}` patterns in a single provider entry's `api_key` and `base_url`.
fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
    if let Some(ref mut e) = entry {
        if let Some(ref mut key) = e.api_key {
            *key = resolve_str(key);
        }
        if let Some(ref mut url) = e.base_url {
            *url = resolve_str(url);
        }
        if let Some(ref mut model) = e.model {
            *model = resolve_str(model);
        }
    }
}

/// Replace {env:VAR} with the environment variable value.
fn resolve_str(s: &str) -> String {
    resolve_with(s, |name| std::env::var(name).ok())
}

fn resolve_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("{env:") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 5..start + end];
        let value = lookup(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        from = start + value.len();
    }
    result
}

/// First non-empty key in precedence order.
fn pick_api_key(
    provider_env: Option<String>,
    configured: Option<&str>,
    generic_env: Option<String>,
) -> Option<String> {
    provider_env
        .filter(|k| !k.is_empty())
        .or_else(|| configured.filter(|k| !k.is_empty()).map(String::from))
        .or_else(|| generic_env.filter(|k| !k.is_empty()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
