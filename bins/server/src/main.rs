//! Jajan API Server
//!
//! Main entry point for the Jajan backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jajan_api::{AppState, create_router};
use jajan_core::magic::MagicService;
use jajan_core::post::PostService;
use jajan_core::storage::{PathCodec, StorageConfig, StorageService};
use jajan_db::{PostRepository, connect};
use jajan_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jajan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create photo storage and the post lifecycle service
    let storage_config = StorageConfig::from_settings(&config.storage);
    let codec = PathCodec::new(storage_config.bucket.clone());
    let storage = StorageService::from_config(storage_config)?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Photo storage configured"
    );

    let posts = PostService::new(
        Arc::new(PostRepository::new(db.clone())),
        Arc::new(storage),
        codec,
    );

    // Create note magic service when a provider key is configured
    let magic = MagicService::from_settings(&config.magic)?.map(Arc::new);
    if magic.is_none() {
        info!("Note magic disabled: no provider API key configured");
    }

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        posts: Arc::new(posts),
        magic,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
