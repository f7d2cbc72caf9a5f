//! LLM provider abstraction for cocobot.
//!
//! Wraps rig-core's provider clients behind a [`Provider`] struct with enum
//! dispatch, keeping provider-specific details out of the session layer.
//! Supports Gemini, Anthropic, OpenAI, OpenRouter, and Ollama (local) via
//! [`kind::ProviderKind`].

mod client;
mod kind;
mod resolve;

pub use client::Provider;
pub use resolve::{resolve_model, ModelSelection};
