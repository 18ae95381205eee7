//! Post operation error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Which mutation a persistence failure belongs to. Determines the generic
/// message shown to the caller; internal detail is logged, never surfaced,
/// so a failed write cannot leak whether the target row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Inserting a new post.
    Create,
    /// Updating an existing post.
    Update,
    /// Deleting a post.
    Delete,
    /// Reading posts.
    Load,
}

impl MutationKind {
    /// The caller-facing message for this kind of failure.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Create => "Could not save entry. Please try again.",
            Self::Update => "Could not update entry. Please try again.",
            Self::Delete => "Could not delete entry. Please try again.",
            Self::Load => "Could not load entries. Please try again.",
        }
    }
}

/// Post operation errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// Input validation failed; the message is surfaced verbatim.
    #[error("{0}")]
    Validation(String),

    /// Photo upload or URL generation failed.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// The repository write failed or affected zero rows.
    #[error("{}", .0.message())]
    Persistence(MutationKind),
}

impl PostError {
    /// The validation error for a missing place name.
    #[must_use]
    pub fn place_name_required() -> Self {
        Self::Validation("Place name is required.".to_string())
    }
}
