//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/history` and `/help`. Neither touches the conversation: the
//! transcript is append-only and commands never reach the model.

use colored::Colorize;

use crate::output::Renderer;
use crate::session::ConversationSession;

/// Slash commands the REPL handles itself.
const COMMANDS: &[&str] = &["/history", "/help"];

/// Whether `input` names one of the REPL's own commands. Anything else,
/// slash or not, is an utterance for the model.
pub(crate) fn is_command(input: &str) -> bool {
    COMMANDS.contains(&input)
}

/// Handle one of the REPL's own commands. Other input is left untouched.
pub(crate) fn handle_slash_command(
    command: &str,
    session: &ConversationSession,
    renderer: &mut dyn Renderer,
) {
    match command {
        "/history" => {
            for msg in session.messages() {
                renderer.render_message(&msg);
            }
        }
        "/help" => {
            println!("{}", "Comandos:".bold());
            println!("  {} - mostrar la conversación", "/history".cyan());
            println!("  {} - mostrar esta ayuda", "/help".cyan());
            println!("  {} - salir", "Ctrl+D".cyan());
        }
        _ => {}
    }
}
