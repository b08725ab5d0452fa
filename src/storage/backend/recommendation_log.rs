//! RecommendationLogStore implementation for SeaOrmStorage

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use tracing::debug;

use super::SeaOrmStorage;
use crate::errors::{EngagementError, Result};
use crate::storage::models::{KindClickCounts, NewRecommendationLog};
use crate::storage::traits::RecommendationLogStore;

use migration::entities::recommendation_log;

#[derive(Debug, FromQueryResult)]
struct KindCountRow {
    recommendation_kind: String,
    count: i64,
}

fn new_log_to_active_model(entry: &NewRecommendationLog) -> recommendation_log::ActiveModel {
    recommendation_log::ActiveModel {
        batch_id: Set(entry.batch_id.clone()),
        reader_id: Set(entry.reader_id.clone()),
        article_id: Set(entry.article_id.clone()),
        recommendation_kind: Set(entry.recommendation_kind.clone()),
        rank_position: Set(entry.rank_position),
        score: Set(entry.score),
        context: Set(entry.context.clone()),
        was_clicked: Set(false),
        created_at: Set(entry.created_at),
        clicked_at: Set(None),
        ..Default::default()
    }
}

impl SeaOrmStorage {
    /// 按类型分组计数；`clicked_only` 时只计已点击的曝光
    async fn grouped_log_counts(
        &self,
        since: DateTime<Utc>,
        kind_filter: Option<&str>,
        clicked_only: bool,
    ) -> Result<Vec<KindCountRow>> {
        let mut query = recommendation_log::Entity::find()
            .select_only()
            .column(recommendation_log::Column::RecommendationKind)
            .column_as(recommendation_log::Column::Id.count(), "count")
            .filter(recommendation_log::Column::CreatedAt.gte(since));

        if let Some(kind) = kind_filter {
            query = query.filter(recommendation_log::Column::RecommendationKind.eq(kind));
        }
        if clicked_only {
            query = query.filter(recommendation_log::Column::WasClicked.eq(true));
        }

        query
            .group_by(recommendation_log::Column::RecommendationKind)
            .into_model::<KindCountRow>()
            .all(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("统计推荐日志失败: {}", e)))
    }
}

#[async_trait]
impl RecommendationLogStore for SeaOrmStorage {
    async fn insert_batch(&self, entries: Vec<NewRecommendationLog>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let total = entries.len();
        let models: Vec<recommendation_log::ActiveModel> =
            entries.iter().map(new_log_to_active_model).collect();

        let db = &self.db;
        self.retry
            .run("insert_recommendation_batch", || async {
                let txn = db.begin().await?;
                recommendation_log::Entity::insert_many(models.clone())
                    .exec(&txn)
                    .await?;
                txn.commit().await
            })
            .await
            .map_err(|e| EngagementError::storage(format!("写入推荐日志失败: {}", e)))?;

        debug!(
            "Recommendation batch {} written ({} entries)",
            entries[0].batch_id, total
        );
        Ok(())
    }

    async fn mark_latest_clicked(
        &self,
        reader_id: &str,
        article_id: &str,
        recommendation_kind: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool> {
        let db = &self.db;
        let updated = self
            .retry
            .run("mark_recommendation_clicked", || async {
                let latest = recommendation_log::Entity::find()
                    .filter(recommendation_log::Column::ReaderId.eq(reader_id))
                    .filter(recommendation_log::Column::ArticleId.eq(article_id))
                    .filter(recommendation_log::Column::RecommendationKind.eq(recommendation_kind))
                    .filter(recommendation_log::Column::WasClicked.eq(false))
                    .order_by_desc(recommendation_log::Column::CreatedAt)
                    .order_by_desc(recommendation_log::Column::Id)
                    .one(db)
                    .await?;

                let Some(latest) = latest else {
                    return Ok(false);
                };

                // 条件更新：并发点击只会有一个生效
                let result = recommendation_log::Entity::update_many()
                    .col_expr(recommendation_log::Column::WasClicked, Expr::val(true).into())
                    .col_expr(
                        recommendation_log::Column::ClickedAt,
                        Expr::val(Some(clicked_at)).into(),
                    )
                    .filter(recommendation_log::Column::Id.eq(latest.id))
                    .filter(recommendation_log::Column::WasClicked.eq(false))
                    .exec(db)
                    .await?;

                Ok(result.rows_affected > 0)
            })
            .await
            .map_err(|e| EngagementError::storage(format!("更新推荐点击失败: {}", e)))?;

        if updated {
            debug!(
                "Recommendation click recorded: {} -> {} ({})",
                reader_id, article_id, recommendation_kind
            );
        }
        Ok(updated)
    }

    async fn click_counts_by_kind(
        &self,
        since: DateTime<Utc>,
        kind_filter: Option<&str>,
    ) -> Result<Vec<KindClickCounts>> {
        let totals = self.grouped_log_counts(since, kind_filter, false).await?;
        let clicked = self.grouped_log_counts(since, kind_filter, true).await?;

        let mut by_kind: BTreeMap<String, KindClickCounts> = BTreeMap::new();
        for row in totals {
            by_kind.insert(
                row.recommendation_kind.clone(),
                KindClickCounts {
                    recommendation_kind: row.recommendation_kind,
                    total: row.count.max(0) as u64,
                    clicked: 0,
                },
            );
        }
        for row in clicked {
            if let Some(counts) = by_kind.get_mut(&row.recommendation_kind) {
                counts.clicked = row.count.max(0) as u64;
            }
        }

        Ok(by_kind.into_values().collect())
    }
}
