//! Output rendering abstraction for cocobot.
//!
//! Defines the [`Renderer`] trait that decouples the chat loop from the
//! display layer. [`StdoutRenderer`] prints to the terminal.

use colored::Colorize;
use std::io::{self, Write};

use crate::constants::TYPING_INDICATOR;
use crate::format;
use crate::message::Message;

/// Trait for rendering the conversation.
pub trait Renderer {
    /// Render one message from the transcript.
    fn render_message(&mut self, message: &Message);

    /// Show that the bot is composing a reply.
    fn show_typing(&mut self);

    /// Remove the typing indicator, if shown.
    fn clear_typing(&mut self);

    /// Report a local error that is not part of the conversation.
    fn render_error(&mut self, err: &str);
}

/// Renders the conversation directly to stdout.
#[derive(Default)]
pub struct StdoutRenderer {
    typing: bool,
}

impl StdoutRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for StdoutRenderer {
    fn render_message(&mut self, message: &Message) {
        self.clear_typing();
        println!("{}", format::format_message(message));
        println!();
    }

    fn show_typing(&mut self) {
        if !self.typing {
            print!("{}", TYPING_INDICATOR.dimmed());
            io::stdout().flush().ok();
            self.typing = true;
        }
    }

    fn clear_typing(&mut self) {
        if self.typing {
            // Return to column 0 and clear the line
            print!("\r\x1b[2K");
            io::stdout().flush().ok();
            self.typing = false;
        }
    }

    fn render_error(&mut self, err: &str) {
        self.clear_typing();
        eprintln!("{} {}", "error:".red().bold(), err);
    }
}
