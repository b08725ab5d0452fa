//! 读者与文章表迁移
//!
//! profiles / articles 由上游内容管线写入，这里只建表供查找使用。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::Username).string_len(255).null())
                    .col(ColumnDef::new(Profiles::FullName).text().null())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Articles::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Articles::Title).text().not_null())
                    .col(ColumnDef::new(Articles::Summary).text().null())
                    .col(ColumnDef::new(Articles::OriginalUrl).text().not_null())
                    .col(ColumnDef::new(Articles::ImageUrl).text().null())
                    .col(ColumnDef::new(Articles::Category).string_len(255).null())
                    .col(ColumnDef::new(Articles::Place).text().null())
                    .col(
                        ColumnDef::new(Articles::PublishedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Articles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 按分类 + 发布时间倒序取候选
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_articles_category_published")
                    .table(Articles::Table)
                    .col(Articles::Category)
                    .col(Articles::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_articles_published_at")
                    .table(Articles::Table)
                    .col(Articles::PublishedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_articles_published_at")
                    .table(Articles::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_articles_category_published")
                    .table(Articles::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Articles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Profiles {
    #[sea_orm(iden = "profiles")]
    Table,
    Id,
    Username,
    FullName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Articles {
    #[sea_orm(iden = "articles")]
    Table,
    Id,
    Title,
    Summary,
    OriginalUrl,
    ImageUrl,
    Category,
    Place,
    PublishedAt,
    CreatedAt,
}
