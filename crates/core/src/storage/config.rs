//! Storage configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use jajan_shared::config::StorageSettings;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Supabase Storage, Cloudflare R2, AWS S3.
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Local filesystem (development only).
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create an S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create a local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// Storage service configuration, built once at startup and passed into the
/// service and codec constructors.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Bucket (container) holding post photos.
    pub bucket: String,
    /// Base URL under which objects are publicly reachable.
    pub public_base_url: Option<String>,
    /// Maximum photo size in bytes.
    pub max_photo_bytes: u64,
    /// Allowed MIME types for upload.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Default max photo size: 10MB.
    pub const DEFAULT_MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider, bucket: impl Into<String>) -> Self {
        Self {
            provider,
            bucket: bucket.into(),
            public_base_url: None,
            max_photo_bytes: Self::DEFAULT_MAX_PHOTO_BYTES,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// Build a storage config from the application settings.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        let provider = match (&settings.s3_endpoint, &settings.s3_access_key_id) {
            (Some(endpoint), Some(access_key_id)) => StorageProvider::s3(
                endpoint,
                access_key_id,
                settings.s3_secret_access_key.clone().unwrap_or_default(),
                settings.s3_region.clone(),
            ),
            _ => StorageProvider::local_fs(settings.local_root.clone()),
        };

        Self {
            provider,
            bucket: settings.bucket.clone(),
            public_base_url: settings.public_base_url.clone(),
            max_photo_bytes: settings.max_photo_bytes,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// Set the public base URL.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Set maximum photo size.
    #[must_use]
    pub fn with_max_photo_bytes(mut self, size: u64) -> Self {
        self.max_photo_bytes = size;
        self
    }

    /// Default allowed MIME types for photos.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        vec![
            "image/png".to_string(),
            "image/jpeg".to_string(),
            "image/gif".to_string(),
            "image/webp".to_string(),
            "image/avif".to_string(),
        ]
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|t| t == mime_type)
    }
}
