//! Shared types, errors, and configuration for Jajan.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs and the opaque owner identifier
//! - Application-wide error types
//! - Configuration management
//! - JWT validation for the external identity provider

pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use types::{OwnerId, PostId};
