//! LLM provider client and completion implementation.
//!
//! Contains the [`Provider`] struct which wraps rig-core provider clients
//! behind enum dispatch, keeping provider-specific details out of the
//! session layer. Supports Gemini, Anthropic, OpenAI, OpenRouter, and Ollama.
//!
//! Requests are single completions: rig-core is never allowed to run tools on
//! its own. Tool calls come back to the session, which decides what to run.

use anyhow::{Context, Result};
use rig::client::CompletionClient;
use rig::completion::{Completion, ToolDefinition as RigToolDefinition};
use rig::message::{
    AssistantContent, Message as RigMessage, Text, ToolCall as RigToolCall, ToolFunction,
};
use rig::providers::{anthropic, gemini, openai, openrouter};
use rig::OneOrMany;

use super::kind::ProviderKind;
use super::resolve::ModelSelection;
use crate::config::Config;
use crate::dialogue::{DialogueModel, DialogueTurn, ModelReply, Role, ToolCall};
use crate::error::SessionError;
use crate::tools::ToolDefinition;

/// Internal enum wrapping provider-specific clients.
enum ClientKind {
    Gemini(gemini::Client),
    Anthropic(anthropic::Client),
    OpenAI(openai::Client),
    OpenRouter(openrouter::Client),
    Ollama(openai::CompletionsClient),
}

/// A configured LLM provider ready to handle completion requests.
///
/// Wraps a rig-core provider client and the target model name. Agents are
/// constructed on each call since they are cheap to create.
pub struct Provider {
    client: ClientKind,
    model: String,
    max_tokens: Option<u64>,
}

/// Builds an agent from the given client, model, system instruction and
/// optional output cap, then executes the provided block with the agent
/// bound to `$agent`.
macro_rules! with_agent {
    ($client:expr, $model:expr, $sys:expr, $max_tokens:expr, |$agent:ident| $body:expr) => {{
        let mut builder = $client.agent($model).preamble($sys);
        if let Some(max_tokens) = $max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        let $agent = builder.build();
        $body
    }};
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`ClientKind`] and executes the same block for each variant,
/// letting the compiler monomorphize per provider.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::Gemini($client) => $body,
            ClientKind::Anthropic($client) => $body,
            ClientKind::OpenAI($client) => $body,
            ClientKind::OpenRouter($client) => $body,
            ClientKind::Ollama($client) => $body,
        }
    };
}

impl Provider {
    /// Creates a new [`Provider`] for the selected backend.
    ///
    /// Resolves the API key through the config precedence chain
    /// (provider env var, then config file, then `API_KEY`).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingCredential`] if no key is found for a
    /// provider that needs one, or [`SessionError::Transport`] if client
    /// construction fails.
    pub fn connect(config: &Config, selection: &ModelSelection) -> Result<Self, SessionError> {
        let kind = selection.provider;
        let api_key = if kind.requires_api_key() {
            config
                .resolve_api_key(kind.name())
                .ok_or_else(|| SessionError::MissingCredential {
                    provider: kind.name(),
                    env_var: kind.env_var(),
                })?
        } else {
            String::new()
        };

        let client = match kind {
            ProviderKind::Gemini => ClientKind::Gemini(
                gemini::Client::new(&api_key).context("Failed to create Gemini client")?,
            ),
            ProviderKind::Anthropic => ClientKind::Anthropic(
                anthropic::Client::new(&api_key).context("Failed to create Anthropic client")?,
            ),
            ProviderKind::OpenAI => ClientKind::OpenAI(
                openai::Client::new(&api_key).context("Failed to create OpenAI client")?,
            ),
            ProviderKind::OpenRouter => ClientKind::OpenRouter(
                openrouter::Client::new(&api_key)
                    .context("Failed to create OpenRouter client")?,
            ),
            ProviderKind::Ollama => {
                let base_url = config
                    .provider
                    .ollama
                    .as_ref()
                    .and_then(|o| o.base_url.as_deref())
                    .filter(|url| !url.is_empty())
                    .unwrap_or(crate::constants::OLLAMA_DEFAULT_BASE_URL);
                // Ollama serves chat completions, not the Responses API.
                ClientKind::Ollama(
                    openai::Client::builder()
                        .api_key("ollama")
                        .base_url(format!("{}/v1", base_url))
                        .build()
                        .context("Failed to create Ollama client")?
                        .completions_api(),
                )
            }
        };

        tracing::debug!(provider = kind.name(), model = %selection.model, "provider ready");
        Ok(Self {
            client,
            model: selection.model.clone(),
            max_tokens: kind.max_tokens(),
        })
    }
}

#[async_trait::async_trait]
impl DialogueModel for Provider {
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[DialogueTurn],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply> {
        let (prompt, chat_history) = split_history(history)?;
        let definitions: Vec<RigToolDefinition> = tools.iter().map(to_rig_definition).collect();

        let choice = dispatch!(self, |client| {
            with_agent!(client, &self.model, system_instruction, self.max_tokens, |agent| {
                agent
                    .completion(prompt.clone(), chat_history.clone())
                    .await
                    .context("Failed to build completion request")?
                    .tools(definitions.clone())
                    .send()
                    .await
                    .context("Completion request failed")?
                    .choice
            })
        });

        Ok(reply_from_choice(choice))
    }
}

/// Splits the dialogue into the turn being answered and the history before it.
fn split_history(history: &[DialogueTurn]) -> Result<(RigMessage, Vec<RigMessage>)> {
    let (last, earlier) = history
        .split_last()
        .context("Cannot request a completion for an empty dialogue")?;
    Ok((
        convert_turn_to_rig(last),
        earlier.iter().map(convert_turn_to_rig).collect(),
    ))
}

fn to_rig_definition(def: &ToolDefinition) -> RigToolDefinition {
    RigToolDefinition {
        name: def.name.clone(),
        description: def.description.clone(),
        parameters: def.parameters.clone(),
    }
}

/// Collects text and tool calls from a completion choice.
///
/// Text parts are concatenated in order; reasoning and other content is
/// dropped.
fn reply_from_choice(choice: OneOrMany<AssistantContent>) -> ModelReply {
    let mut reply = ModelReply::default();
    for item in choice.into_iter() {
        match item {
            AssistantContent::Text(Text { text }) => reply.text.push_str(&text),
            AssistantContent::ToolCall(call) => reply.tool_calls.push(ToolCall {
                call_id: call.call_id,
                signature: call.signature,
                ..ToolCall::new(call.id, call.function.name, call.function.arguments)
            }),
            _ => {}
        }
    }
    reply
}

/// Converts a [`DialogueTurn`] to a rig-core [`RigMessage`].
///
/// - **User** → `RigMessage::User` with text content
/// - **Assistant** (text only) → `RigMessage::Assistant` with text content
/// - **Assistant** (with tool calls) → `RigMessage::Assistant` with `ToolCall` content items
/// - **Tool** (result) → `RigMessage::User` with `ToolResult` content
fn convert_turn_to_rig(turn: &DialogueTurn) -> RigMessage {
    match turn.role {
        Role::User => RigMessage::user(turn.content.as_str()),
        Role::Assistant if turn.tool_calls.is_empty() => {
            RigMessage::assistant(turn.content.as_str())
        }
        Role::Assistant => {
            let mut items: Vec<AssistantContent> = Vec::new();
            if !turn.content.is_empty() {
                items.push(AssistantContent::Text(Text {
                    text: turn.content.clone(),
                }));
            }
            for tc in &turn.tool_calls {
                let mut call = RigToolCall::new(
                    tc.id.clone(),
                    ToolFunction::new(tc.name.clone(), tc.arguments.clone()),
                )
                .with_signature(tc.signature.clone());
                if let Some(call_id) = &tc.call_id {
                    call = call.with_call_id(call_id.clone());
                }
                items.push(AssistantContent::ToolCall(call));
            }
            RigMessage::Assistant {
                id: None,
                content: OneOrMany::many(items)
                    .unwrap_or_else(|_| OneOrMany::one(AssistantContent::text(""))),
            }
        }
        Role::Tool => {
            let tool_call_id = turn.tool_call_id.clone().unwrap_or_else(|| {
                tracing::warn!("tool turn missing tool_call_id, using empty string");
                String::new()
            });
            RigMessage::tool_result_with_call_id(
                tool_call_id,
                turn.call_id.clone(),
                turn.content.as_str(),
            )
        }
    }
}
