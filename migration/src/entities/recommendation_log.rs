//! Recommendation log entity, one row per candidate in a served batch

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recommendation_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub batch_id: String,
    pub reader_id: String,
    pub article_id: String,
    pub recommendation_kind: String,
    /// 1-based, unique within batch_id
    pub rank_position: i32,
    pub score: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub context: Option<String>,
    pub was_clicked: bool,
    pub created_at: DateTimeUtc,
    pub clicked_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
