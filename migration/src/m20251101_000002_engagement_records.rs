//! 阅读行为记录表迁移
//!
//! engagement_records 每行对应一个 (reader, article, kind) 合并单元：
//! - duration_seconds 在合并窗口内累加
//! - scroll_percent 只增不减
//! - last_merged_at 决定是否还能作为合并目标

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EngagementRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EngagementRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EngagementRecords::ReaderId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EngagementRecords::ArticleId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EngagementRecords::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EngagementRecords::DurationSeconds)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(EngagementRecords::ScrollPercent)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EngagementRecords::SourceChannel)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EngagementRecords::RecommendationKind)
                            .string_len(50)
                            .null(),
                    )
                    .col(ColumnDef::new(EngagementRecords::Extra).text().null())
                    .col(
                        ColumnDef::new(EngagementRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EngagementRecords::LastMergedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 合并查找：(reader, article, kind) + 窗口
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_engagement_merge_key")
                    .table(EngagementRecords::Table)
                    .col(EngagementRecords::ReaderId)
                    .col(EngagementRecords::ArticleId)
                    .col(EngagementRecords::Kind)
                    .col(EngagementRecords::LastMergedAt)
                    .to_owned(),
            )
            .await?;

        // 统计查询：reader + created_at 范围
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_engagement_reader_created")
                    .table(EngagementRecords::Table)
                    .col(EngagementRecords::ReaderId)
                    .col(EngagementRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_engagement_reader_created")
                    .table(EngagementRecords::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_engagement_merge_key")
                    .table(EngagementRecords::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(EngagementRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EngagementRecords {
    #[sea_orm(iden = "engagement_records")]
    Table,
    Id,
    ReaderId,
    ArticleId,
    Kind,
    DurationSeconds,
    ScrollPercent,
    SourceChannel,
    RecommendationKind,
    Extra,
    CreatedAt,
    LastMergedAt,
}
