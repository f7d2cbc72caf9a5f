//! Error kinds the conversation session distinguishes.

use thiserror::Error;

/// Failures surfaced by [`crate::session::ConversationSession`].
///
/// `MissingCredential` is fatal: the session never starts. `Transport` is
/// caught at the turn boundary and turned into an apology message.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no API key found for {provider}; set {env_var} or configure it in config.toml")]
    MissingCredential {
        provider: &'static str,
        env_var: String,
    },

    #[error("model transport failed: {0:#}")]
    Transport(#[from] anyhow::Error),
}
