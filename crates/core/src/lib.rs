//! Core business logic for Jajan.
//!
//! This crate holds everything that makes the journal tick without knowing
//! about HTTP or SQL:
//! - `storage`: the object store contract, its OpenDAL implementation, and
//!   the path codec translating public URLs to bucket-relative paths
//! - `post`: the post lifecycle orchestrator keeping rows and photos
//!   consistent across create/update/delete
//! - `magic`: note rewriting through a hosted text-generation API

pub mod magic;
pub mod post;
pub mod storage;
