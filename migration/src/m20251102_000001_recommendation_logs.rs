//! 推荐曝光日志表迁移
//!
//! 每次下发推荐时一条候选一行，点击回填 was_clicked / clicked_at。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecommendationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecommendationLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecommendationLogs::BatchId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendationLogs::ReaderId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendationLogs::ArticleId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendationLogs::RecommendationKind)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendationLogs::RankPosition)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecommendationLogs::Score).double().null())
                    .col(ColumnDef::new(RecommendationLogs::Context).text().null())
                    .col(
                        ColumnDef::new(RecommendationLogs::WasClicked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RecommendationLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendationLogs::ClickedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一批次内 rank_position 唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rec_logs_batch_rank")
                    .table(RecommendationLogs::Table)
                    .col(RecommendationLogs::BatchId)
                    .col(RecommendationLogs::RankPosition)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 点击回填查找
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rec_logs_click_lookup")
                    .table(RecommendationLogs::Table)
                    .col(RecommendationLogs::ReaderId)
                    .col(RecommendationLogs::ArticleId)
                    .col(RecommendationLogs::RecommendationKind)
                    .col(RecommendationLogs::WasClicked)
                    .to_owned(),
            )
            .await?;

        // CTR 时间窗口查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rec_logs_created_at")
                    .table(RecommendationLogs::Table)
                    .col(RecommendationLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_rec_logs_created_at",
            "idx_rec_logs_click_lookup",
            "idx_rec_logs_batch_rank",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(RecommendationLogs::Table)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .drop_table(Table::drop().table(RecommendationLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RecommendationLogs {
    #[sea_orm(iden = "recommendation_logs")]
    Table,
    Id,
    BatchId,
    ReaderId,
    ArticleId,
    RecommendationKind,
    RankPosition,
    Score,
    Context,
    WasClicked,
    CreatedAt,
    ClickedAt,
}
