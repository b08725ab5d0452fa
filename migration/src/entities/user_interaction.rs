//! Legacy per-(profile, article) interaction row

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_interactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub profile_id: String,
    pub article_id: String,
    pub time_spent_seconds: Option<i64>,
    pub visits: Option<i64>,
    pub category: Option<String>,
    /// Pre-typed-column JSON bag, cleared once the row has been merged
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub interaction_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
