pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20251101_000001_profiles_articles;
mod m20251101_000002_engagement_records;
mod m20251102_000001_recommendation_logs;
mod m20251103_000001_user_interactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_profiles_articles::Migration),
            Box::new(m20251101_000002_engagement_records::Migration),
            Box::new(m20251102_000001_recommendation_logs::Migration),
            Box::new(m20251103_000001_user_interactions::Migration),
        ]
    }
}
