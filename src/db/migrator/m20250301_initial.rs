use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Referenced tables first so the foreign keys resolve.
        manager
            .create_table(schema.create_table_from_entity(Users).if_not_exists().to_owned())
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(CachedAnime)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(schema.create_table_from_entity(Genres).if_not_exists().to_owned())
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserProfiles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AnimePreferences)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RecommendationCaches)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RecommendationCacheItems)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(CatalogResponseCache)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CatalogResponseCache).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecommendationCacheItems).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecommendationCaches).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AnimePreferences).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProfiles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genres).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CachedAnime).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
