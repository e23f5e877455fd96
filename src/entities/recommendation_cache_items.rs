use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recommendation_cache_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub cache_id: i32,

    /// Local `cached_anime.id`, not the catalog id
    pub cached_anime_id: i32,

    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recommendation_caches::Entity",
        from = "Column::CacheId",
        to = "super::recommendation_caches::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Cache,

    #[sea_orm(
        belongs_to = "super::cached_anime::Entity",
        from = "Column::CachedAnimeId",
        to = "super::cached_anime::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CachedAnime,
}

impl Related<super::recommendation_caches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cache.def()
    }
}

impl Related<super::cached_anime::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CachedAnime.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
