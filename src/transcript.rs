//! Append-only log of visible messages.

use crate::message::Message;

/// The ordered conversation history as shown to the user.
///
/// Only [`Transcript::push`] mutates the log, so messages are never
/// reordered, edited or removed once appended.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages appended at or after index `from`.
    ///
    /// The REPL uses this to print only what a turn added.
    pub fn since(&self, from: usize) -> &[Message] {
        &self.messages[from.min(self.messages.len())..]
    }
}
