use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_profiles::Entity")]
    UserProfile,

    #[sea_orm(has_many = "super::anime_preferences::Entity")]
    AnimePreferences,

    #[sea_orm(has_one = "super::recommendation_caches::Entity")]
    RecommendationCache,
}

impl Related<super::user_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserProfile.def()
    }
}

impl Related<super::anime_preferences::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnimePreferences.def()
    }
}

impl Related<super::recommendation_caches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecommendationCache.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
