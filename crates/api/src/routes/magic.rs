//! Note magic routes.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use jajan_core::magic::{MagicError, MagicRequest};

/// Creates the note magic routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/magic", post(rewrite_note))
}

/// POST `/magic`
/// Rewrite a note as a summary or a title.
async fn rewrite_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<MagicRequest>,
) -> impl IntoResponse {
    let Some(magic) = &state.magic else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "magic_not_configured",
                "message": "AI magic is not configured."
            })),
        )
            .into_response();
    };

    match magic.rewrite(payload).await {
        Ok(result) => {
            info!(owner = %auth.owner_id(), mode = ?result.mode, "Note rewritten");
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(MagicError::EmptyNote) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_note",
                "message": MagicError::EmptyNote.to_string()
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Note magic failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "magic_failed",
                    "message": "AI magic fizzled out. Try again in a sec."
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, header::AUTHORIZATION},
        middleware::from_fn_with_state,
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::middleware::auth::auth_middleware;
    use jajan_core::magic::MagicService;
    use jajan_core::post::PostService;
    use jajan_core::storage::{PathCodec, StorageConfig, StorageProvider, StorageService};
    use jajan_db::PostRepository;
    use jajan_shared::config::MagicSettings;
    use jajan_shared::{JwtConfig, JwtService, OwnerId};

    fn test_state(magic: Option<Arc<MagicService>>) -> AppState {
        let db = sea_orm::DatabaseConnection::default();
        let storage_config =
            StorageConfig::new(StorageProvider::local_fs("./test_uploads"), "food-posts");
        let storage = StorageService::from_config(storage_config).expect("storage");
        let posts = PostService::new(
            Arc::new(PostRepository::new(db.clone())),
            Arc::new(storage),
            PathCodec::new("food-posts"),
        );

        AppState {
            db: Arc::new(db),
            jwt_service: Arc::new(JwtService::new(JwtConfig::default())),
            posts: Arc::new(posts),
            magic,
        }
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .merge(routes())
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    fn token(state: &AppState) -> String {
        state
            .jwt_service
            .generate_access_token(&OwnerId::new("user_1"))
            .expect("should generate token")
    }

    /// A magic service with a key configured; validation failures short
    /// circuit before any provider call is made.
    fn configured_magic() -> Arc<MagicService> {
        let settings: MagicSettings = serde_json::from_value(serde_json::json!({
            "openai_api_key": "sk-test"
        }))
        .unwrap();
        Arc::new(MagicService::from_settings(&settings).unwrap().unwrap())
    }

    #[tokio::test]
    async fn test_magic_without_token_is_401() {
        let response = app(test_state(None))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/magic")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"note":"hi","mode":"summary"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_magic_unconfigured_is_503() {
        let state = test_state(None);
        let token = token(&state);

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/magic")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"note":"hi","mode":"summary"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_magic_empty_note_is_400_with_message() {
        let state = test_state(Some(configured_magic()));
        let token = token(&state);

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/magic")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"note":"   ","mode":"title"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "empty_note");
        assert_eq!(json["message"], "Write a note first so AI has context.");
    }
}
