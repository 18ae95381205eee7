//! Post lifecycle orchestration.
//!
//! A post is one row plus, optionally, one photo in the object store. This
//! module owns the consistency protocol between the two:
//! - an upload failure never leaves a row pointing at a missing object
//! - storage is never deleted before the row change that drops the last
//!   reference has committed
//! - cleanup of superseded or orphaned photos is best-effort and logged,
//!   never part of an operation's result

mod cache;
mod error;
mod service;
mod types;

pub use cache::ViewCache;
pub use error::{MutationKind, PostError};
pub use service::{PostRepository, PostService};
pub use types::{
    CleanupOutcome, CreatePostInput, NewPostRecord, PhotoUpload, Post, PostChanges,
    UpdatePostInput,
};
