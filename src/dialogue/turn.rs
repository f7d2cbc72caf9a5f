//! Turn types for the dialogue context sent to the model.
//!
//! [`DialogueTurn`] mirrors the role/content shape chat models expect,
//! including assistant tool calls and the tool results fed back to them.
//! These are converted to provider-specific formats (rig-core's `Message`)
//! at request time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Identifier used to match the result to this call.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments exactly as the model supplied them.
    pub arguments: Value,
    /// Provider correlation id that the tool result must echo back
    /// (OpenAI Responses API `call_id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Opaque signature some providers attach to the call (Gemini thought
    /// signatures). Replayed unchanged with the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            call_id: None,
            signature: None,
        }
    }
}

/// The role of a turn in the dialogue context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// One entry of the dialogue context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Provider correlation id of the answered call, if it had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl DialogueTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            call_id: None,
        }
    }

    pub fn assistant(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_calls,
            tool_call_id: None,
            call_id: None,
        }
    }

    /// Creates the turn answering `call`, carrying its ids so the provider
    /// can pair the result with the call.
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(call.id.clone()),
            call_id: call.call_id.clone(),
        }
    }
}

/// What the model answered for one request: text, tool calls, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            text: String::new(),
            tool_calls: vec![call],
        }
    }

    /// Only the first call is honoured; any further calls in the same reply
    /// are ignored.
    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.tool_calls.first()
    }
}

impl From<&ModelReply> for DialogueTurn {
    fn from(reply: &ModelReply) -> Self {
        DialogueTurn::assistant(reply.text.clone(), reply.tool_calls.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_carries_call_id() {
        let call = ToolCall {
            call_id: Some("call_abc".into()),
            ..ToolCall::new("fc_1", "guardarPedido", json!({}))
        };
        let turn = DialogueTurn::tool_result(&call, r#"{"result":"ok"}"#);
        assert_eq!(turn.role, Role::Tool);
        assert_eq!(turn.tool_call_id.as_deref(), Some("fc_1"));
        assert_eq!(turn.call_id.as_deref(), Some("call_abc"));
    }

    #[test]
    fn test_first_tool_call_ignores_extras() {
        let reply = ModelReply {
            text: String::new(),
            tool_calls: vec![
                ToolCall::new("a", "guardarPedido", json!({})),
                ToolCall::new("b", "otra", json!({})),
            ],
        };
        assert_eq!(reply.first_tool_call().map(|c| c.id.as_str()), Some("a"));
    }

    #[test]
    fn test_reply_becomes_assistant_turn() {
        let reply = ModelReply::text("hola");
        let turn = DialogueTurn::from(&reply);
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "hola");
        assert!(turn.tool_calls.is_empty());
    }
}
