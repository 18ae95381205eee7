//! Object store contract and its OpenDAL-backed implementation.

use std::future::Future;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Characters percent-encoded inside a public URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'%')
    .add(b'?')
    .add(b'#')
    .add(b'"')
    .add(b'/');

/// The object store capability the post lifecycle depends on.
///
/// Uploads are insert-only: a path is never overwritten, and the path codec
/// guarantees uniqueness so collisions are not a practical concern.
/// `remove` is best-effort by contract; callers log failures and move on.
pub trait ObjectStore: Send + Sync {
    /// Stores a blob and returns its public URL.
    fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Returns the public URL for a stored path.
    fn public_url(&self, path: &str) -> Result<String, StorageError>;

    /// Deletes a blob by path.
    fn remove(&self, path: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Photo storage backed by Apache OpenDAL.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config)?;
        Ok(Self { operator, config })
    }

    /// Create the OpenDAL operator for the configured provider.
    fn create_operator(config: &StorageConfig) -> Result<Operator, StorageError> {
        match &config.provider {
            StorageProvider::S3 {
                endpoint,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(&config.bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
        }
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if photo size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_photo_bytes {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_photo_bytes,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl ObjectStore for StorageService {
    /// Stores a photo and returns its public URL.
    ///
    /// The write is conditional on the path being vacant, so an upload can
    /// never clobber an existing photo. A missing bucket maps to
    /// [`StorageError::BucketNotFound`]; everything else surfaces as a
    /// generic operation failure.
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.validate_upload(content_type, bytes.len() as u64)?;

        self.operator
            .write_with(path, bytes)
            .content_type(content_type)
            .if_not_exists(true)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::bucket_not_found(&self.config.bucket),
                _ => StorageError::Operation(e.to_string()),
            })?;

        self.public_url(path)
    }

    /// Builds the public URL for a stored path:
    /// `{base_url}/storage/v1/object/public/{bucket}/{path}`.
    fn public_url(&self, path: &str) -> Result<String, StorageError> {
        let base = self
            .config
            .public_base_url
            .as_deref()
            .ok_or(StorageError::NoPublicUrl)?
            .trim_end_matches('/');

        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect();

        Ok(format!(
            "{base}/storage/v1/object/public/{}/{}",
            self.config.bucket,
            encoded.join("/")
        ))
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        self.operator.delete(path).await.map_err(StorageError::from)
    }
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}
