//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Object storage configuration.
    pub storage: StorageSettings,
    /// Note magic (text generation) configuration.
    #[serde(default)]
    pub magic: MagicSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key shared with the identity provider.
    pub secret: String,
    /// Access token expiration in seconds (only used when issuing dev tokens).
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Bucket (container) holding post photos.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Base URL under which uploaded objects are publicly reachable.
    pub public_base_url: Option<String>,
    /// S3-compatible endpoint (Supabase Storage, R2, AWS S3). When absent,
    /// the local filesystem provider is used.
    pub s3_endpoint: Option<String>,
    /// S3 access key ID.
    pub s3_access_key_id: Option<String>,
    /// S3 secret access key.
    pub s3_secret_access_key: Option<String>,
    /// S3 region.
    #[serde(default = "default_region")]
    pub s3_region: String,
    /// Root directory for the local filesystem provider.
    #[serde(default = "default_local_root")]
    pub local_root: String,
    /// Maximum photo size in bytes.
    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: u64,
}

/// Default bucket name, matching the provisioning docs.
pub const DEFAULT_BUCKET: &str = "food-posts";

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_local_root() -> String {
    "./storage".to_string()
}

fn default_max_photo_bytes() -> u64 {
    10 * 1024 * 1024
}

/// Note magic configuration. All fields optional; the feature is disabled
/// when no provider key is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MagicSettings {
    /// OpenAI API key.
    pub openai_api_key: Option<String>,
    /// OpenAI model name.
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Anthropic API key.
    pub anthropic_api_key: Option<String>,
    /// Anthropic model name.
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("JAJAN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults() {
        let settings: StorageSettings = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(settings.bucket, DEFAULT_BUCKET);
        assert_eq!(settings.max_photo_bytes, 10 * 1024 * 1024);
        assert!(settings.public_base_url.is_none());
        assert!(settings.s3_endpoint.is_none());
    }

    #[test]
    fn test_magic_defaults() {
        let settings = MagicSettings::default();
        assert!(settings.openai_api_key.is_none());
        assert!(settings.anthropic_api_key.is_none());
    }

    #[test]
    fn test_magic_models() {
        let settings: MagicSettings = serde_json::from_value(serde_json::json!({
            "openai_api_key": "sk-test"
        }))
        .unwrap();
        assert_eq!(settings.openai_model, "gpt-4o-mini");
        assert_eq!(settings.anthropic_model, "claude-3-haiku-20240307");
    }
}
