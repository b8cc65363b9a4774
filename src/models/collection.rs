use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // UUID
    pub name: String,
    /// None means the unscoped/global owner scope.
    pub owner_id: Option<String>,
    pub is_public: bool,
    pub created_at: String, // RFC3339
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::collection_quote::Entity")]
    CollectionQuote,
}

impl Related<super::collection_quote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionQuote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
