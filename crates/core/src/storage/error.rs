//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The configured bucket does not exist. A configuration problem, kept
    /// distinct from transport failures so callers can surface it as such.
    #[error(
        "storage bucket \"{bucket}\" was not found. Create it in your storage provider (or set JAJAN__STORAGE__BUCKET)"
    )]
    BucketNotFound {
        /// The missing bucket name.
        bucket: String,
    },

    /// Photo size exceeds maximum allowed.
    #[error("photo size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual photo size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// MIME type not allowed.
    #[error("MIME type '{mime_type}' is not allowed")]
    InvalidMimeType {
        /// The invalid MIME type.
        mime_type: String,
    },

    /// No public URL can be produced for the stored object.
    #[error("no public URL configured for storage objects")]
    NoPublicUrl,

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Underlying storage operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a bucket-not-found error.
    #[must_use]
    pub fn bucket_not_found(bucket: impl Into<String>) -> Self {
        Self::BucketNotFound {
            bucket: bucket.into(),
        }
    }

    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create an invalid MIME type error.
    #[must_use]
    pub fn invalid_mime_type(mime_type: impl Into<String>) -> Self {
        Self::InvalidMimeType {
            mime_type: mime_type.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Whether this error points at the bucket being missing.
    #[must_use]
    pub const fn is_bucket_missing(&self) -> bool {
        matches!(self, Self::BucketNotFound { .. })
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        Self::Operation(err.to_string())
    }
}
