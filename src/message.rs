//! Visible chat messages.
//!
//! A [`Message`] is one bubble in the conversation the user sees: who sent
//! it and what it says. Messages are immutable once created; the dialogue
//! context sent to the model is tracked separately in
//! [`crate::dialogue::DialogueTurn`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a visible message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single visible message in the conversation.
///
/// Fields are private so a message cannot be edited after it is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    text: String,
    sender: Sender,
    #[serde(skip, default = "Local::now")]
    sent_at: DateTime<Local>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }

    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            sent_at: Local::now(),
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Local time the message was created, used for display only.
    pub fn sent_at(&self) -> DateTime<Local> {
        self.sent_at
    }

    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "tú"),
            Sender::Bot => write!(f, "coco"),
        }
    }
}
