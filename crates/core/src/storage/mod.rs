//! Photo storage built on Apache OpenDAL.
//!
//! One configured bucket holds every post photo under `{owner}/{file}`.
//! Supported providers:
//! - S3-compatible: Supabase Storage, Cloudflare R2, AWS S3
//! - Local filesystem (development only)
//!
//! The [`ObjectStore`] trait is the contract the post lifecycle depends on;
//! [`StorageService`] is its OpenDAL-backed implementation, and
//! [`PathCodec`] maps public URLs back to deletable storage paths.

mod config;
mod error;
mod path;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use path::PathCodec;
pub use service::{ObjectStore, StorageService};
