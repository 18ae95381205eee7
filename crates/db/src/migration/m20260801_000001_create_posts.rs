//! Initial migration: the `jajan_posts` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(POSTS_SQL).await?;
        db.execute_unprepared(POSTS_INDEX_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TABLE IF EXISTS jajan_posts CASCADE;")
            .await?;

        Ok(())
    }
}

/// Post rows. `place_name` is checked non-blank at the database too, so the
/// orchestrator's validation invariant survives manual writes.
const POSTS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS jajan_posts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    user_id TEXT NOT NULL,
    place_name TEXT NOT NULL CHECK (btrim(place_name) <> ''),
    notes TEXT,
    image_url TEXT
);
";

/// Listing queries filter by owner and sort newest first.
const POSTS_INDEX_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_jajan_posts_user_created
    ON jajan_posts (user_id, created_at DESC);
";
