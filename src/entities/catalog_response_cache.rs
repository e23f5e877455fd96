use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "catalog_response_cache")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// SHA-256 hex digest of the request body
    #[sea_orm(unique)]
    pub signature: String,

    #[sea_orm(column_type = "Text")]
    pub response_json: String,

    pub created_at: String,

    pub expires_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
