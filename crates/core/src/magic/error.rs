//! Note magic error types.

use thiserror::Error;

/// Note magic errors.
#[derive(Debug, Error)]
pub enum MagicError {
    /// No provider API key is configured.
    #[error("No AI provider configured. Set a provider API key in the magic settings.")]
    NotConfigured,

    /// The note to rewrite is empty.
    #[error("Write a note first so AI has context.")]
    EmptyNote,

    /// Provider client could not be constructed.
    #[error("text generation configuration error: {0}")]
    Configuration(String),

    /// The provider call failed; detail is logged, callers show a generic
    /// message.
    #[error("text generation failed: {0}")]
    Provider(String),
}

impl MagicError {
    /// Create a provider error.
    #[must_use]
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
