//! Entry point for cocobot, a conversational order-taking assistant.
//!
//! This binary loads environment variables, parses CLI arguments via [`cli`],
//! sets up logging, and dispatches to the appropriate subcommand handler.

mod chat;
mod cli;
mod config;
mod constants;
mod dialogue;
mod error;
mod format;
mod message;
mod orders;
mod output;
mod provider;
mod session;
mod tools;
mod transcript;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Runs the cocobot CLI.
///
/// Loads `.env` files (silently ignored if absent), parses command-line
/// arguments, installs the tracing subscriber and dispatches the chosen
/// subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    init_tracing(cli.log_level.as_deref());
    cli::run(cli).await
}

/// Installs a stderr subscriber so log lines never mix with chat output.
///
/// `RUST_LOG` wins when set; otherwise the `--log-level` directive, falling
/// back to [`constants::DEFAULT_LOG_DIRECTIVE`].
fn init_tracing(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = log_level.unwrap_or(constants::DEFAULT_LOG_DIRECTIVE);
        EnvFilter::try_new(directive)
            .unwrap_or_else(|_| EnvFilter::new(constants::DEFAULT_LOG_DIRECTIVE))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
