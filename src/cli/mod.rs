//! Command-line interface definition and dispatch for cocobot.
//!
//! Uses [`clap`] for argument parsing with derive macros. Running `cocobot`
//! with no subcommand starts the order chat.

use crate::{chat, config, provider};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Top-level CLI structure for cocobot.
#[derive(Parser)]
#[command(name = "cocobot", about = "Conversational order taking for Puro Coco")]
pub struct Cli {
    /// Tracing filter directive (e.g. `cocobot=debug`). `RUST_LOG` wins if set.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the cocobot CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive order chat
    Chat {
        /// Provider to use (gemini, anthropic, openai, openrouter, ollama)
        #[arg(long)]
        provider: Option<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
        /// Script endpoint that receives confirmed orders
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
///
/// Reads cocobot's TOML configuration stored at the XDG config path
/// (`~/.config/cocobot/config.toml`).
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective config, with API keys masked
    Show,
    /// Print the config file path
    Path,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => start_chat(None, None, None).await,
        Some(Commands::Chat {
            provider,
            model,
            endpoint,
        }) => start_chat(provider, model, endpoint).await,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => {
                let config = config::Config::load()?;
                let path = config::Config::config_path()?;
                println!("{} {}", "Config path:".bold(), path.display());
                println!();
                let toml_str = toml::to_string_pretty(&config.masked())?;
                println!("{}", toml_str);
                Ok(())
            }
            ConfigAction::Path => {
                println!("{}", config::Config::config_path()?.display());
                Ok(())
            }
        },
    }
}

async fn start_chat(
    provider_name: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
) -> Result<()> {
    let mut config = config::Config::load()?;
    let selection = provider::resolve_model(provider_name.as_deref(), model.as_deref(), &config)?;
    config.model = selection.model.clone();

    let endpoint = endpoint.unwrap_or_else(|| config.order_endpoint().to_string());
    tracing::debug!(
        provider = selection.provider.name(),
        model = %selection.model,
        "starting chat"
    );
    chat::run_chat(config, &selection, &endpoint).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_chat() {
        let cli = Cli::try_parse_from(["cocobot"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_chat_flags_and_global_log_level() {
        let cli = Cli::try_parse_from([
            "cocobot",
            "chat",
            "--provider",
            "ollama",
            "-m",
            "llama3",
            "--endpoint",
            "http://localhost:9/exec",
            "--log-level",
            "cocobot=debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("cocobot=debug"));
        match cli.command {
            Some(Commands::Chat {
                provider,
                model,
                endpoint,
            }) => {
                assert_eq!(provider.as_deref(), Some("ollama"));
                assert_eq!(model.as_deref(), Some("llama3"));
                assert_eq!(endpoint.as_deref(), Some("http://localhost:9/exec"));
            }
            _ => panic!("expected chat subcommand"),
        }
    }

    #[test]
    fn test_config_path_subcommand() {
        let cli = Cli::try_parse_from(["cocobot", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Path
            })
        ));
    }
}
