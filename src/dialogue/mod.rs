//! The stateful dialogue context held with the external model.
//!
//! [`DialogueHandle`] owns the system instruction, the declared tools and
//! the running context. Each send appends to the context and asks the
//! [`DialogueModel`] for the next reply, so calls must be serialized: the
//! handle takes `&mut self` and the session keeps it behind a mutex.

mod turn;

use anyhow::Result;
use serde_json::Value;

use crate::tools::ToolDefinition;

pub use turn::{DialogueTurn, ModelReply, Role, ToolCall};

/// A conversational model that can answer with text or a tool call.
///
/// Implemented by [`crate::provider::Provider`] for real backends and by
/// scripted fakes in tests.
#[async_trait::async_trait]
pub trait DialogueModel: Send + Sync {
    /// Produces the reply to the last turn of `history`.
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[DialogueTurn],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply>;
}

/// One live conversation with the model.
pub struct DialogueHandle {
    model: Box<dyn DialogueModel>,
    system_instruction: String,
    tools: Vec<ToolDefinition>,
    history: Vec<DialogueTurn>,
}

impl DialogueHandle {
    pub fn new(
        model: Box<dyn DialogueModel>,
        system_instruction: impl Into<String>,
        tools: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            model,
            system_instruction: system_instruction.into(),
            tools,
            history: Vec::new(),
        }
    }

    /// Sends a user utterance and returns the model's reply.
    pub async fn send_message(&mut self, text: &str) -> Result<ModelReply> {
        self.exchange(DialogueTurn::user(text)).await
    }

    /// Feeds a tool result back for `call` and returns the follow-up reply.
    pub async fn send_tool_result(&mut self, call: &ToolCall, result: &Value) -> Result<ModelReply> {
        self.exchange(DialogueTurn::tool_result(call, result.to_string()))
            .await
    }

    /// Marks the current end of the context.
    pub fn checkpoint(&self) -> usize {
        self.history.len()
    }

    /// Drops every turn added after `checkpoint`.
    ///
    /// Used when a turn fails halfway so a dangling tool call never reaches
    /// the model on the next request.
    pub fn rollback_to(&mut self, checkpoint: usize) {
        self.history.truncate(checkpoint);
    }

    #[cfg(test)]
    pub fn history(&self) -> &[DialogueTurn] {
        &self.history
    }

    /// Appends `turn`, asks for a reply and records it. On failure the
    /// context is left as it was before the call.
    async fn exchange(&mut self, turn: DialogueTurn) -> Result<ModelReply> {
        let checkpoint = self.checkpoint();
        self.history.push(turn);
        match self
            .model
            .complete(&self.system_instruction, &self.history, &self.tools)
            .await
        {
            Ok(reply) => {
                self.history.push(DialogueTurn::from(&reply));
                Ok(reply)
            }
            Err(e) => {
                self.rollback_to(checkpoint);
                Err(e)
            }
        }
    }
}
