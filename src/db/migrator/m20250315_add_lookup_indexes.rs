use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_anime_preferences_user_anime ON anime_preferences(user_id, anime_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_recommendation_items_cache_anime ON recommendation_cache_items(cache_id, cached_anime_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_recommendation_caches_updated_at ON recommendation_caches(updated_at)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_catalog_response_cache_expires_at ON catalog_response_cache(expires_at)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_catalog_response_cache_expires_at")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_recommendation_caches_updated_at")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_recommendation_items_cache_anime")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_anime_preferences_user_anime")
            .await?;

        Ok(())
    }
}
