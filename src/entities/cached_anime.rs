use sea_orm::entity::prelude::*;

/// Local mirror of catalog media, keyed on the catalog's own id.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cached_anime")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// External catalog id
    #[sea_orm(unique)]
    pub anime_id: i32,

    pub title_romaji: String,

    pub title_english: Option<String>,

    pub title_native: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// JSON array of genre names
    #[sea_orm(column_type = "Text")]
    pub genres: String,

    pub average_score: Option<f64>,

    pub popularity: i32,

    pub episodes: Option<i32>,

    pub status: String,

    pub cover_image: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recommendation_cache_items::Entity")]
    RecommendationCacheItems,
}

impl Related<super::recommendation_cache_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecommendationCacheItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
