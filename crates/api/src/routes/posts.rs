//! Journal post routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use jajan_core::post::{CreatePostInput, PhotoUpload, Post, PostError, UpdatePostInput};
use jajan_core::storage::StorageError;
use jajan_shared::PostId;

/// Creates the post routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a post.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// Post ID.
    pub id: Uuid,
    /// Created at timestamp (ISO 8601).
    pub created_at: String,
    /// Place name.
    pub place_name: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Public photo URL.
    pub image_url: Option<String>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.into_inner(),
            created_at: post.created_at.to_rfc3339(),
            place_name: post.place_name,
            notes: post.notes,
            image_url: post.photo_url,
        }
    }
}

/// Query parameters for deleting a post.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// Public URL of the post's photo, when one exists.
    pub image_url: Option<String>,
}

/// Collected multipart form fields for create/update.
#[derive(Debug, Default)]
struct PostForm {
    place_name: String,
    notes: Option<String>,
    existing_image_url: Option<String>,
    photo: Option<PhotoUpload>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Reads the multipart form the journal UI submits.
///
/// Field names match the form: `placeName`, `notes`, `photo`,
/// `existingImageUrl`. Unknown fields are ignored.
async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, Response> {
    let mut form = PostForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(invalid_multipart(&e.to_string())),
        };

        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            "placeName" => {
                form.place_name = field
                    .text()
                    .await
                    .map_err(|e| invalid_multipart(&e.to_string()))?;
            }
            "notes" => {
                form.notes = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| invalid_multipart(&e.to_string()))?,
                );
            }
            "existingImageUrl" => {
                let url = field
                    .text()
                    .await
                    .map_err(|e| invalid_multipart(&e.to_string()))?;
                form.existing_image_url = Some(url).filter(|u| !u.is_empty());
            }
            "photo" => {
                let file_name = field.file_name().unwrap_or("photo").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| invalid_multipart(&e.to_string()))?;
                form.photo = Some(PhotoUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

fn invalid_multipart(detail: &str) -> Response {
    error!(detail, "Failed to read multipart form");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_form",
            "message": "Could not read the submitted form."
        })),
    )
        .into_response()
}

/// Maps a post lifecycle error onto the wire.
///
/// Validation messages pass through verbatim; a missing bucket is surfaced
/// as the configuration problem it is; everything else collapses to the
/// operation's generic message so internal detail stays in the logs.
fn post_error_response(err: &PostError) -> Response {
    match err {
        PostError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "validation_error", "message": message })),
        )
            .into_response(),
        PostError::Storage(storage_err) => match storage_err {
            StorageError::BucketNotFound { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "bucket_missing",
                    "message": storage_err.to_string()
                })),
            )
                .into_response(),
            StorageError::FileTooLarge { .. } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "file_too_large",
                    "message": storage_err.to_string()
                })),
            )
                .into_response(),
            StorageError::InvalidMimeType { .. } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_mime_type",
                    "message": storage_err.to_string()
                })),
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "storage_error",
                    "message": "Unable to upload photo. Please try again."
                })),
            )
                .into_response(),
        },
        PostError::Persistence(kind) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "persistence_error",
                "message": kind.message()
            })),
        )
            .into_response(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/posts`
/// List the authenticated owner's posts, newest first.
async fn list_posts(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let owner = auth.owner_id();

    match state.posts.list(&owner).await {
        Ok(posts) => {
            let items: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
            (StatusCode::OK, Json(json!({ "posts": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, owner = %owner, "Failed to list posts");
            post_error_response(&e)
        }
    }
}

/// GET `/posts/{id}`
/// Fetch one post.
async fn get_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let owner = auth.owner_id();

    match state.posts.get(PostId::from_uuid(id), &owner).await {
        Ok(Some(post)) => (StatusCode::OK, Json(PostResponse::from(post))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Post not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, post_id = %id, "Failed to fetch post");
            post_error_response(&e)
        }
    }
}

/// POST `/posts`
/// Create a post from the journal form.
async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match read_post_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let input = CreatePostInput {
        owner: auth.owner_id(),
        place_name: form.place_name,
        notes: form.notes,
        photo: form.photo,
    };

    match state.posts.create(input).await {
        Ok(post) => {
            info!(post_id = %post.id, "Post created");
            (StatusCode::CREATED, Json(json!({ "id": post.id }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create post");
            post_error_response(&e)
        }
    }
}

/// PUT `/posts/{id}`
/// Update a post, optionally replacing its photo.
async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match read_post_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let input = UpdatePostInput {
        id: PostId::from_uuid(id),
        owner: auth.owner_id(),
        place_name: form.place_name,
        notes: form.notes,
        existing_photo_url: form.existing_image_url,
        new_photo: form.photo,
    };

    match state.posts.update(input).await {
        Ok(()) => {
            info!(post_id = %id, "Post updated");
            (StatusCode::OK, Json(json!({ "id": id }))).into_response()
        }
        Err(e) => {
            error!(error = %e, post_id = %id, "Failed to update post");
            post_error_response(&e)
        }
    }
}

/// DELETE `/posts/{id}?image_url=...`
/// Delete a post; the photo URL (when known) lets the service reclaim the
/// blob after the row is gone.
async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> impl IntoResponse {
    let owner = auth.owner_id();

    match state
        .posts
        .delete(PostId::from_uuid(id), &owner, params.image_url.as_deref())
        .await
    {
        Ok(()) => {
            info!(post_id = %id, "Post deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => {
            error!(error = %e, post_id = %id, "Failed to delete post");
            post_error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jajan_core::post::MutationKind;

    #[test]
    fn test_validation_error_maps_to_400_verbatim() {
        let response = post_error_response(&PostError::place_name_required());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bucket_missing_maps_to_503() {
        let err = PostError::Storage(StorageError::bucket_not_found("food-posts"));
        let response = post_error_response(&err);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_generic_storage_error_maps_to_500() {
        let err = PostError::Storage(StorageError::operation("connection reset"));
        let response = post_error_response(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_oversized_photo_maps_to_400() {
        let err = PostError::Storage(StorageError::file_too_large(20_000_000, 10_000_000));
        let response = post_error_response(&err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_persistence_error_maps_to_500() {
        let response = post_error_response(&PostError::Persistence(MutationKind::Update));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_post_response_serialization() {
        let post = Post {
            id: PostId::new(),
            created_at: chrono::Utc::now(),
            owner: jajan_shared::OwnerId::new("user_1"),
            place_name: "Blue Bottle".to_string(),
            notes: None,
            photo_url: None,
        };
        let response = PostResponse::from(post);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["place_name"], "Blue Bottle");
        assert_eq!(value["notes"], serde_json::Value::Null);
        assert_eq!(value["image_url"], serde_json::Value::Null);
        // The owner never appears on the wire.
        assert!(value.get("owner").is_none());
    }
}
