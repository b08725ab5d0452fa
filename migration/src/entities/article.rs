use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub original_url: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,
    /// Topic used for category statistics and recommendation
    pub category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub place: Option<String>,
    pub published_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::engagement_record::Entity")]
    EngagementRecord,
}

impl Related<super::engagement_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EngagementRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
