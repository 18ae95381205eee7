//! Post repository for database operations.
//!
//! Implements the core `PostRepository` trait using SeaORM. Every mutation
//! filters by `id` AND `user_id` in a single statement, so ownership can
//! never be checked separately from existence.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, RuntimeErr, Set,
};
use tracing::{error, warn};

use crate::entities::posts;
use jajan_core::post::{
    MutationKind, NewPostRecord, Post, PostChanges, PostError,
    PostRepository as PostRepoTrait,
};
use jajan_shared::{OwnerId, PostId};

/// Postgres error code for "relation does not exist".
const MISSING_TABLE_CODE: &str = "42P01";

/// Post repository implementation.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PostRepoTrait for PostRepository {
    async fn insert(&self, record: NewPostRecord) -> Result<Post, PostError> {
        let active_model = posts::ActiveModel {
            id: Set(record.id.into_inner()),
            created_at: Set(Utc::now().into()),
            user_id: Set(record.owner.into_inner()),
            place_name: Set(record.place_name),
            notes: Set(record.notes),
            image_url: Set(record.photo_url),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| persistence(MutationKind::Create, &e))?;

        Ok(to_domain(model))
    }

    async fn update(
        &self,
        id: PostId,
        owner: &OwnerId,
        changes: PostChanges,
    ) -> Result<u64, PostError> {
        let result = posts::Entity::update_many()
            .col_expr(posts::Column::PlaceName, Expr::value(changes.place_name))
            .col_expr(posts::Column::Notes, Expr::value(changes.notes))
            .col_expr(posts::Column::ImageUrl, Expr::value(changes.photo_url))
            .filter(posts::Column::Id.eq(id.into_inner()))
            .filter(posts::Column::UserId.eq(owner.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| persistence(MutationKind::Update, &e))?;

        Ok(result.rows_affected)
    }

    async fn delete(&self, id: PostId, owner: &OwnerId) -> Result<u64, PostError> {
        let result = posts::Entity::delete_many()
            .filter(posts::Column::Id.eq(id.into_inner()))
            .filter(posts::Column::UserId.eq(owner.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| persistence(MutationKind::Delete, &e))?;

        Ok(result.rows_affected)
    }

    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Post>, PostError> {
        let result = posts::Entity::find()
            .filter(posts::Column::UserId.eq(owner.as_str()))
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.db)
            .await;

        match result {
            Ok(models) => Ok(models.into_iter().map(to_domain).collect()),
            Err(e) if is_missing_table(&e) => {
                warn!("jajan_posts table not found; returning an empty listing");
                Ok(Vec::new())
            }
            Err(e) => Err(persistence(MutationKind::Load, &e)),
        }
    }

    async fn find_by_id(&self, id: PostId, owner: &OwnerId) -> Result<Option<Post>, PostError> {
        let result = posts::Entity::find_by_id(id.into_inner())
            .filter(posts::Column::UserId.eq(owner.as_str()))
            .one(&self.db)
            .await;

        match result {
            Ok(model) => Ok(model.map(to_domain)),
            Err(e) if is_missing_table(&e) => {
                warn!("jajan_posts table not found; returning no post");
                Ok(None)
            }
            Err(e) => Err(persistence(MutationKind::Load, &e)),
        }
    }
}

/// Logs the internal error and returns the generic persistence failure for
/// the operation; database detail never reaches the caller.
fn persistence(kind: MutationKind, err: &DbErr) -> PostError {
    error!(error = %err, ?kind, "Post repository operation failed");
    PostError::Persistence(kind)
}

/// Detects Postgres "relation does not exist" so reads can degrade to an
/// empty result before the schema has been provisioned.
fn is_missing_table(err: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
    | DbErr::Conn(RuntimeErr::SqlxError(sqlx_err))) = err
    else {
        return false;
    };

    match sqlx_err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(MISSING_TABLE_CODE),
        _ => false,
    }
}

/// Convert database model to domain model.
fn to_domain(model: posts::Model) -> Post {
    Post {
        id: PostId::from_uuid(model.id),
        created_at: model.created_at.with_timezone(&chrono::Utc),
        owner: OwnerId::new(model.user_id),
        place_name: model.place_name,
        notes: model.notes,
        photo_url: model.image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_missing_table() {
        assert!(!is_missing_table(&DbErr::Custom("boom".to_string())));
        assert!(!is_missing_table(&DbErr::RecordNotFound(
            "jajan_posts".to_string()
        )));
    }

    #[test]
    fn test_non_42p01_sqlx_error_is_not_missing_table() {
        let err = DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::PoolClosed));
        assert!(!is_missing_table(&err));
    }

    #[test]
    fn test_to_domain_maps_columns() {
        let id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();
        let model = posts::Model {
            id,
            created_at: now.into(),
            user_id: "user_1".to_string(),
            place_name: "Blue Bottle".to_string(),
            notes: None,
            image_url: Some("https://example.com/x.jpg".to_string()),
        };

        let post = to_domain(model);
        assert_eq!(post.id.into_inner(), id);
        assert_eq!(post.owner.as_str(), "user_1");
        assert_eq!(post.place_name, "Blue Bottle");
        assert!(post.notes.is_none());
        assert_eq!(post.photo_url.as_deref(), Some("https://example.com/x.jpg"));
    }
}
