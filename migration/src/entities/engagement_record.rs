//! Engagement record entity, one row per merged (reader, article, kind) unit

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "engagement_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub reader_id: String,
    pub article_id: String,
    /// view / read / like / bookmark / click / share
    pub kind: String,
    pub duration_seconds: i64,
    pub scroll_percent: Option<f64>,
    pub source_channel: String,
    pub recommendation_kind: Option<String>,
    /// Serialized JSON object with auxiliary signals
    #[sea_orm(column_type = "Text", nullable)]
    pub extra: Option<String>,
    pub created_at: DateTimeUtc,
    pub last_merged_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
