//! 旧版交互表迁移
//!
//! 旧数据把累计时长 / 访问次数序列化在 note 文本里，这里增加类型化列，
//! note 只作为未迁移行的兜底来源保留。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserInteractions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserInteractions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserInteractions::ProfileId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserInteractions::ArticleId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserInteractions::TimeSpentSeconds)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(UserInteractions::Visits).big_integer().null())
                    .col(
                        ColumnDef::new(UserInteractions::Category)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(UserInteractions::Note).text().null())
                    .col(
                        ColumnDef::new(UserInteractions::InteractionAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_interactions_pair")
                    .table(UserInteractions::Table)
                    .col(UserInteractions::ProfileId)
                    .col(UserInteractions::ArticleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_interactions_pair")
                    .table(UserInteractions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(UserInteractions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserInteractions {
    #[sea_orm(iden = "user_interactions")]
    Table,
    Id,
    ProfileId,
    ArticleId,
    TimeSpentSeconds,
    Visits,
    Category,
    Note,
    InteractionAt,
}
