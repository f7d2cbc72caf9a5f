//! Interactive order chat for cocobot.
//!
//! Builds the [`ConversationSession`], prints the greeting, then loops on
//! [`rustyline`] input. Input is only read between turns, so nothing can be
//! typed while the bot is answering.

mod commands;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

use crate::config::Config;
use crate::dialogue::DialogueModel;
use crate::orders::HttpOrderSink;
use crate::output::{Renderer, StdoutRenderer};
use crate::provider::{ModelSelection, Provider};
use crate::session::{ConversationSession, SessionOptions, TurnOutcome};
use crate::tools::{SaveOrderTool, ToolRegistry};

/// Runs the interactive order chat.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in the chat
/// - **Ctrl+D**: exits cleanly
/// - Line history is kept in memory only
///
/// # Errors
///
/// Returns an error if the session cannot be initialized (after showing the
/// bot's error message) or if the terminal cannot be read.
pub async fn run_chat(config: Config, selection: &ModelSelection, endpoint: &str) -> Result<()> {
    let session = build_session(&config, selection, endpoint)?;
    let mut renderer = StdoutRenderer::new();

    println!(
        "{} [model: {}] (Ctrl+D para salir)",
        crate::constants::APP_NAME.bold().cyan(),
        selection.model.yellow(),
    );
    println!();

    if let Some(err) = session.init_error() {
        for msg in session.messages() {
            renderer.render_message(&msg);
        }
        anyhow::bail!("{err}");
    }

    renderer.show_typing();
    session.start().await;
    for msg in session.messages() {
        renderer.render_message(&msg);
    }

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline(&format!("{} ", ">".green().bold())) {
            Ok(line) => match classify_input(&line) {
                Input::Blank => continue,
                Input::Command(cmd) => {
                    commands::handle_slash_command(cmd, &session, &mut renderer);
                }
                Input::Utterance(text) => {
                    let _ = rl.add_history_entry(text);
                    println!();

                    let mark = session.message_count();
                    renderer.show_typing();
                    let outcome = session.handle_user_turn(text).await;
                    renderer.clear_typing();
                    if outcome == TurnOutcome::Ignored {
                        continue;
                    }

                    // The user's own line is already on screen.
                    for msg in session.messages_since(mark) {
                        if msg.is_bot() {
                            renderer.render_message(&msg);
                        }
                    }
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "¡Hasta luego!".dimmed());
                break;
            }
            Err(e) => {
                renderer.render_error(&e.to_string());
                break;
            }
        }
    }

    Ok(())
}

/// What a line read from the terminal asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Blank,
    Command(&'a str),
    /// Sent to the session exactly as typed.
    Utterance(&'a str),
}

fn classify_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Blank
    } else if commands::is_command(trimmed) {
        Input::Command(trimmed)
    } else {
        Input::Utterance(line)
    }
}

/// Wires the provider, the order endpoint and the `guardarPedido` tool into
/// a session. A missing API key does not fail here; it yields a session that
/// reports the problem through its transcript.
fn build_session(
    config: &Config,
    selection: &ModelSelection,
    endpoint: &str,
) -> Result<ConversationSession> {
    let sink = HttpOrderSink::new(endpoint)?;
    tracing::info!(endpoint = sink.endpoint(), "orders will be posted to the script endpoint");

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(SaveOrderTool::new(Arc::new(sink))));

    let model = Provider::connect(config, selection)
        .map(|provider| Box::new(provider) as Box<dyn DialogueModel>);

    let options = SessionOptions {
        system_instruction: config.system_instruction().to_string(),
        opening_utterance: config.opening_utterance().to_string(),
    };
    Ok(ConversationSession::initialize(model, tools, options))
}
