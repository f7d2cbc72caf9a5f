//! File loading and merging for cocobot configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{default_model, Config, OrdersConfig, ProviderConfig, ProviderEntry};

impl Config {
    /// Loads the global config from `~/.config/cocobot/config.toml`.
    ///
    /// If no config file exists, creates one with sensible defaults
    /// (including `{env:VAR}` placeholders for API keys) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = default_config_toml();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!(path = %path.display(), "wrote default config");
            let config: Config = toml::from_str(&default_toml)
                .with_context(|| "Failed to parse default config".to_string())?;
            return Ok(config);
        }

        Self::load_file(&path)
    }

    /// Look for cocobot.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "using project config");
                return Self::load_file(&candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            provider: ProviderConfig {
                gemini: merge_entry(global.provider.gemini, project.provider.gemini),
                anthropic: merge_entry(global.provider.anthropic, project.provider.anthropic),
                openai: merge_entry(global.provider.openai, project.provider.openai),
                openrouter: merge_entry(global.provider.openrouter, project.provider.openrouter),
                ollama: merge_entry(global.provider.ollama, project.provider.ollama),
            },
            default_provider: project.default_provider.or(global.default_provider),
            system_prompt: project.system_prompt.or(global.system_prompt),
            greeting: project.greeting.or(global.greeting),
            orders: OrdersConfig {
                endpoint: project.orders.endpoint.or(global.orders.endpoint),
            },
        }
    }
}

/// Field-wise merge of one provider entry; project fields win.
fn merge_entry(
    global: Option<ProviderEntry>,
    project: Option<ProviderEntry>,
) -> Option<ProviderEntry> {
    match (global, project) {
        (Some(g), Some(p)) => Some(ProviderEntry {
            api_key: p.api_key.or(g.api_key),
            base_url: p.base_url.or(g.base_url),
            model: p.model.or(g.model),
        }),
        (g, p) => p.or(g),
    }
}

/// Contents written on first run.
fn default_config_toml() -> String {
    format!(
        r#"model = "{model}"
default_provider = "{provider}"

[provider.gemini]
api_key = "{{env:GEMINI_API_KEY}}"

[provider.anthropic]
api_key = "{{env:ANTHROPIC_API_KEY}}"

[provider.openai]
api_key = "{{env:OPENAI_API_KEY}}"

[provider.openrouter]
api_key = "{{env:OPENROUTER_API_KEY}}"

[provider.ollama]
base_url = "{ollama}"

[orders]
endpoint = "{endpoint}"
"#,
        model = default_model(),
        provider = crate::constants::DEFAULT_PROVIDER,
        ollama = crate::constants::OLLAMA_DEFAULT_BASE_URL,
        endpoint = crate::constants::DEFAULT_ORDER_ENDPOINT,
    )
}
