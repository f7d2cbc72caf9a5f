//! Conversation session and turn dispatcher.
//!
//! A [`ConversationSession`] owns the one live [`DialogueHandle`] and the
//! append-only [`Transcript`]. Turns are serialized by a busy flag: while a
//! turn (or the opening greeting) is in flight every other turn is ignored.
//! Each turn performs at most one tool round-trip:
//!
//! ```text
//! Idle -> Sending -> ToolRequested -> PersistingAndRelaying -> Idle
//!                 \-> DirectReply -------------------------> Idle
//! ```
//!
//! Failures never escape a turn. They become a single apologetic bot
//! message and the session stays usable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

use crate::constants::{
    CONNECT_APOLOGY_TEXT, DEFAULT_SYSTEM_PROMPT, INIT_FAILURE_TEXT, OPENING_UTTERANCE,
    ORDER_SAVE_FAILED_TEXT, TURN_APOLOGY_TEXT,
};
use crate::dialogue::{DialogueHandle, DialogueModel, ModelReply, ToolCall};
use crate::error::SessionError;
use crate::message::Message;
use crate::tools::{ToolRegistry, ToolResult};
use crate::transcript::Transcript;

/// Where the current turn is in the send/relay sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Sending,
    ToolRequested,
    PersistingAndRelaying,
    DirectReply,
}

/// What [`ConversationSession::handle_user_turn`] did with an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, a turn already in flight, or no live dialogue.
    Ignored,
    /// The model answered and its reply was appended.
    Replied,
    /// The turn failed and an apology was appended instead.
    Apologized,
}

/// Fixed inputs used to open the dialogue.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub system_instruction: String,
    pub opening_utterance: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_PROMPT.to_string(),
            opening_utterance: OPENING_UTTERANCE.to_string(),
        }
    }
}

/// The single running conversation.
pub struct ConversationSession {
    dialogue: AsyncMutex<Option<DialogueHandle>>,
    tools: ToolRegistry,
    transcript: Mutex<Transcript>,
    busy: AtomicBool,
    phase: Mutex<TurnPhase>,
    opening_utterance: String,
    init_error: Option<SessionError>,
}

/// Clears the busy flag and resets the phase when a turn ends, whichever
/// path it took.
struct BusyGuard<'a> {
    session: &'a ConversationSession,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.session.set_phase(TurnPhase::Idle);
        self.session.busy.store(false, Ordering::Release);
    }
}

impl ConversationSession {
    /// Builds the session around `model`.
    ///
    /// When the model could not be constructed (typically a missing API key)
    /// the session is created without a dialogue handle: the transcript holds
    /// one bot error message and every later turn is ignored.
    pub fn initialize(
        model: Result<Box<dyn DialogueModel>, SessionError>,
        tools: ToolRegistry,
        options: SessionOptions,
    ) -> Self {
        let mut transcript = Transcript::new();
        let (dialogue, init_error) = match model {
            Ok(model) => {
                let handle =
                    DialogueHandle::new(model, options.system_instruction, tools.definitions());
                (Some(handle), None)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize the dialogue");
                transcript.push(Message::bot(INIT_FAILURE_TEXT));
                (None, Some(e))
            }
        };

        Self {
            dialogue: AsyncMutex::new(dialogue),
            tools,
            transcript: Mutex::new(transcript),
            busy: AtomicBool::new(false),
            phase: Mutex::new(TurnPhase::Idle),
            opening_utterance: options.opening_utterance,
            init_error,
        }
    }

    /// Whether a dialogue handle is live.
    pub fn is_ready(&self) -> bool {
        self.init_error.is_none()
    }

    pub fn init_error(&self) -> Option<&SessionError> {
        self.init_error.as_ref()
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub fn phase(&self) -> TurnPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the visible conversation.
    pub fn messages(&self) -> Vec<Message> {
        self.transcript().messages().to_vec()
    }

    pub fn message_count(&self) -> usize {
        self.transcript().len()
    }

    /// Messages appended at or after index `from`.
    pub fn messages_since(&self, from: usize) -> Vec<Message> {
        self.transcript().since(from).to_vec()
    }

    /// Sends the opening utterance and appends the scripted greeting.
    ///
    /// A transport failure appends a connection apology instead; the session
    /// remains usable.
    pub async fn start(&self) {
        let Some(_busy) = self.enter_busy() else {
            return;
        };
        let mut dialogue = self.dialogue.lock().await;
        let Some(handle) = dialogue.as_mut() else {
            return;
        };

        self.set_phase(TurnPhase::Sending);
        match handle.send_message(&self.opening_utterance).await {
            Ok(reply) => {
                tracing::info!("conversation started");
                self.append(Message::bot(reply.text));
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "error starting conversation");
                self.append(Message::bot(CONNECT_APOLOGY_TEXT));
            }
        }
    }

    /// Processes one user utterance end to end.
    pub async fn handle_user_turn(&self, text: &str) -> TurnOutcome {
        if text.trim().is_empty() || !self.is_ready() {
            return TurnOutcome::Ignored;
        }
        // Claim the flag before touching the transcript so a concurrent
        // caller cannot interleave its user message with ours.
        let Some(_busy) = self.enter_busy() else {
            tracing::debug!("turn ignored: another turn is in flight");
            return TurnOutcome::Ignored;
        };

        self.append(Message::user(text));

        match self.run_turn(text).await {
            Ok(reply) => {
                self.append(Message::bot(reply));
                TurnOutcome::Replied
            }
            Err(e) => {
                tracing::error!(error = %e, "error sending message");
                self.append(Message::bot(TURN_APOLOGY_TEXT));
                TurnOutcome::Apologized
            }
        }
    }

    /// Runs the send/relay sequence against the dialogue handle.
    ///
    /// A failure midway rolls the context back to where the turn began.
    async fn run_turn(&self, text: &str) -> Result<String, SessionError> {
        let mut dialogue = self.dialogue.lock().await;
        let handle = dialogue
            .as_mut()
            .ok_or_else(|| SessionError::Transport(anyhow::anyhow!("Chat not initialized")))?;

        let checkpoint = handle.checkpoint();
        let result = self.relay(handle, text).await;
        if result.is_err() {
            handle.rollback_to(checkpoint);
        }
        result
    }

    async fn relay(&self, handle: &mut DialogueHandle, text: &str) -> Result<String, SessionError> {
        self.set_phase(TurnPhase::Sending);
        let reply = handle.send_message(text).await?;

        let reply = match self.requested_tool(&reply) {
            Some(call) => {
                self.set_phase(TurnPhase::ToolRequested);
                tracing::info!(tool = %call.name, "model requested a tool call");

                self.set_phase(TurnPhase::PersistingAndRelaying);
                let result = self.execute_tool(&call).await;
                handle.send_tool_result(&call, &result.payload).await?
            }
            None => {
                self.set_phase(TurnPhase::DirectReply);
                reply
            }
        };

        Ok(reply.text)
    }

    /// The first tool call of `reply`, if it names a registered tool.
    fn requested_tool(&self, reply: &ModelReply) -> Option<ToolCall> {
        let call = reply.first_tool_call()?;
        if reply.tool_calls.len() > 1 {
            tracing::warn!(
                count = reply.tool_calls.len(),
                "model requested several tool calls; only the first is run"
            );
        }
        if !self.tools.contains(&call.name) {
            tracing::warn!(tool = %call.name, "ignoring call to an undeclared tool");
            return None;
        }
        Some(call.clone())
    }

    /// Runs the tool. Any error is folded into an error result so the
    /// dialogue always receives something to answer.
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(&call.name, call.arguments.clone()).await {
            Ok(result) => {
                if result.is_error {
                    tracing::warn!(tool = %call.name, "tool reported an error to the model");
                }
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %format!("{e:#}"), "tool failed");
                ToolResult::error(ORDER_SAVE_FAILED_TEXT)
            }
        }
    }

    fn enter_busy(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { session: self })
    }

    fn set_phase(&self, phase: TurnPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn append(&self, message: Message) {
        self.transcript().push(message);
    }

    fn transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests;
