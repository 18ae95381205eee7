//! Post types and data structures.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jajan_shared::{OwnerId, PostId};

/// Post domain model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier.
    pub id: PostId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owner subject; scopes all access.
    pub owner: OwnerId,
    /// Where the food memory happened.
    pub place_name: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Public URL of the photo, when one exists.
    pub photo_url: Option<String>,
}

/// An uploaded photo as received from the client.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Original file name (used only for its extension).
    pub file_name: String,
    /// MIME type of the file.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Bytes,
}

impl PhotoUpload {
    /// An empty file input is treated as "no photo".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Owner subject.
    pub owner: OwnerId,
    /// Place name (validated non-empty after trimming).
    pub place_name: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Optional photo.
    pub photo: Option<PhotoUpload>,
}

/// Input for updating a post.
#[derive(Debug, Clone)]
pub struct UpdatePostInput {
    /// Post to update.
    pub id: PostId,
    /// Owner subject; the row write filters on this too.
    pub owner: OwnerId,
    /// Place name (validated non-empty after trimming).
    pub place_name: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// URL of the photo currently on the post, if any.
    pub existing_photo_url: Option<String>,
    /// Replacement photo, if any.
    pub new_photo: Option<PhotoUpload>,
}

/// A fully prepared row for insertion.
#[derive(Debug, Clone)]
pub struct NewPostRecord {
    /// Pre-generated post ID.
    pub id: PostId,
    /// Owner subject.
    pub owner: OwnerId,
    /// Trimmed place name.
    pub place_name: String,
    /// Normalized notes.
    pub notes: Option<String>,
    /// Public photo URL, when a photo was uploaded.
    pub photo_url: Option<String>,
}

/// The mutable columns of a post row.
#[derive(Debug, Clone)]
pub struct PostChanges {
    /// Trimmed place name.
    pub place_name: String,
    /// Normalized notes.
    pub notes: Option<String>,
    /// Photo URL after the operation (new upload or carried over).
    pub photo_url: Option<String>,
}

/// Result of a best-effort photo cleanup.
///
/// Logged by the orchestrator, never part of an operation's return type:
/// by the time cleanup runs, the primary operation has already succeeded or
/// failed on its own terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The blob was deleted.
    Removed,
    /// No deletable path could be derived (foreign or legacy URL).
    Skipped,
    /// The delete was attempted and failed.
    Failed(String),
}
