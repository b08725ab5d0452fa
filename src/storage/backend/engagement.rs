//! EngagementStore implementation for SeaOrmStorage
//!
//! The merge path runs inside a transaction: locate the newest record of the
//! same (reader, article, kind) still inside the window, then apply a
//! conditional UPDATE that adds the duration and keeps the larger scroll
//! value in SQL. If the row left the window between the two statements the
//! UPDATE touches nothing and a fresh row is inserted instead.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{CaseStatement, Expr, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, ExprTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionTrait,
};
use tracing::{debug, warn};

use super::SeaOrmStorage;
use super::converters::{
    decode_extra, draft_to_active_model, encode_extra, merge_extra, record_from_model,
};
use crate::errors::{EngagementError, Result};
use crate::storage::models::{
    ActivityExportRow, ActivityKind, CategorizedEngagement, EngagementDraft, MergeOutcome,
    RecordOutcome,
};
use crate::storage::traits::EngagementStore;

use migration::entities::{article, engagement_record};

#[derive(Debug, FromQueryResult)]
struct CategorizedRow {
    article_id: String,
    category: Option<String>,
    duration_seconds: i64,
}

#[derive(Debug, FromQueryResult)]
struct ExportRow {
    reader_id: String,
    article_id: String,
    kind: String,
    duration_seconds: i64,
    scroll_percent: Option<f64>,
    category: Option<String>,
    place: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl EngagementStore for SeaOrmStorage {
    async fn merge_or_insert(
        &self,
        draft: &EngagementDraft,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<RecordOutcome> {
        let db = &self.db;
        let lock_rows = self.supports_row_locks();
        let operation = format!(
            "merge_or_insert({}, {}, {})",
            draft.reader_id, draft.article_id, draft.kind
        );

        let (model, outcome) = self
            .retry
            .run(&operation, || async {
                merge_in_transaction(db, draft, now, window, lock_rows).await
            })
            .await
            .map_err(|e| EngagementError::storage(format!("记录阅读行为失败: {}", e)))?;

        debug!(
            "Engagement {:?}: record {} ({} / {} / {}) duration={}s",
            outcome, model.id, model.reader_id, model.article_id, model.kind, model.duration_seconds
        );

        Ok(RecordOutcome {
            record: record_from_model(model)?,
            outcome,
        })
    }

    async fn categorized_since(
        &self,
        reader_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CategorizedEngagement>> {
        let rows = engagement_record::Entity::find()
            .select_only()
            .column(engagement_record::Column::ArticleId)
            .column(engagement_record::Column::DurationSeconds)
            .column_as(article::Column::Category, "category")
            .join(JoinType::LeftJoin, engagement_record::Relation::Article.def())
            .filter(engagement_record::Column::ReaderId.eq(reader_id))
            .filter(engagement_record::Column::CreatedAt.gte(since))
            .order_by_asc(engagement_record::Column::CreatedAt)
            .order_by_asc(engagement_record::Column::Id)
            .into_model::<CategorizedRow>()
            .all(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("查询阅读记录失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| CategorizedEngagement {
                article_id: row.article_id,
                category: row.category,
                duration_seconds: Ord::max(row.duration_seconds, 0),
            })
            .collect())
    }

    async fn engaged_article_ids(&self, reader_id: &str) -> Result<Vec<String>> {
        engagement_record::Entity::find()
            .select_only()
            .column(engagement_record::Column::ArticleId)
            .distinct()
            .filter(engagement_record::Column::ReaderId.eq(reader_id))
            .order_by_asc(engagement_record::Column::ArticleId)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("查询已读文章失败: {}", e)))
    }

    async fn recent_article_ids(
        &self,
        reader_id: &str,
        kinds: &[ActivityKind],
        limit: u64,
    ) -> Result<Vec<String>> {
        if limit == 0 || kinds.is_empty() {
            return Ok(Vec::new());
        }

        let kind_names: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
        let ids: Vec<String> = engagement_record::Entity::find()
            .select_only()
            .column(engagement_record::Column::ArticleId)
            .filter(engagement_record::Column::ReaderId.eq(reader_id))
            .filter(engagement_record::Column::Kind.is_in(kind_names))
            .order_by_desc(engagement_record::Column::LastMergedAt)
            .order_by_desc(engagement_record::Column::Id)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("查询最近阅读失败: {}", e)))?;

        let mut seen = HashSet::new();
        Ok(ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .take(limit as usize)
            .collect())
    }

    async fn export_activities(
        &self,
        reader_id: Option<&str>,
        limit: u64,
    ) -> Result<Vec<ActivityExportRow>> {
        let mut query = engagement_record::Entity::find()
            .select_only()
            .column(engagement_record::Column::ReaderId)
            .column(engagement_record::Column::ArticleId)
            .column(engagement_record::Column::Kind)
            .column(engagement_record::Column::DurationSeconds)
            .column(engagement_record::Column::ScrollPercent)
            .column(engagement_record::Column::CreatedAt)
            .column_as(article::Column::Category, "category")
            .column_as(article::Column::Place, "place")
            .join(JoinType::LeftJoin, engagement_record::Relation::Article.def());

        if let Some(reader_id) = reader_id {
            query = query.filter(engagement_record::Column::ReaderId.eq(reader_id));
        }

        let rows = query
            .order_by_desc(engagement_record::Column::CreatedAt)
            .order_by_desc(engagement_record::Column::Id)
            .limit(limit)
            .into_model::<ExportRow>()
            .all(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("导出阅读记录失败: {}", e)))?;

        let mut exported = Vec::with_capacity(rows.len());
        for row in rows {
            let Ok(kind) = row.kind.parse::<ActivityKind>() else {
                warn!(
                    "Skipping exported activity with unknown kind '{}' ({} / {})",
                    row.kind, row.reader_id, row.article_id
                );
                continue;
            };
            exported.push(ActivityExportRow {
                reader_id: row.reader_id,
                article_id: row.article_id,
                kind,
                duration_seconds: Ord::max(row.duration_seconds, 0),
                scroll_percent: row.scroll_percent.unwrap_or(0.0),
                category: row.category,
                place: row.place,
                created_at: row.created_at,
            });
        }
        Ok(exported)
    }
}

/// 单次事务内的合并 / 新建
async fn merge_in_transaction(
    db: &DatabaseConnection,
    draft: &EngagementDraft,
    now: DateTime<Utc>,
    window: Duration,
    lock_rows: bool,
) -> std::result::Result<(engagement_record::Model, MergeOutcome), DbErr> {
    let cutoff = now
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let txn = db.begin().await?;

    let mut candidate = engagement_record::Entity::find()
        .filter(engagement_record::Column::ReaderId.eq(draft.reader_id.as_str()))
        .filter(engagement_record::Column::ArticleId.eq(draft.article_id.as_str()))
        .filter(engagement_record::Column::Kind.eq(draft.kind.to_string()))
        .filter(engagement_record::Column::LastMergedAt.gte(cutoff))
        .order_by_desc(engagement_record::Column::LastMergedAt)
        .order_by_desc(engagement_record::Column::Id);
    if lock_rows {
        candidate = candidate.lock_exclusive();
    }

    if let Some(existing) = candidate.one(&txn).await? {
        let merged_extra = merge_extra(decode_extra(existing.extra.as_deref()), &draft.extra);
        let extra = encode_extra(&merged_extra).map_err(|e| DbErr::Custom(e.to_string()))?;

        // 累计时长在 i64::MAX 处封顶，SQL 里的整数溢出会变成 REAL
        let addend = Ord::max(draft.duration_seconds, 0);
        let saturating_sum = CaseStatement::new()
            .case(
                Expr::col(engagement_record::Column::DurationSeconds)
                    .gt(Expr::val(i64::MAX - addend)),
                Expr::val(i64::MAX),
            )
            .finally(Expr::col(engagement_record::Column::DurationSeconds).add(Expr::val(addend)));

        let mut stmt = Query::update();
        stmt.table(engagement_record::Entity)
            .value(engagement_record::Column::DurationSeconds, saturating_sum)
            .value(engagement_record::Column::LastMergedAt, Expr::val(now))
            .value(engagement_record::Column::Extra, Expr::val(extra))
            .and_where(Expr::col(engagement_record::Column::Id).eq(Expr::val(existing.id)))
            .and_where(Expr::col(engagement_record::Column::LastMergedAt).gte(Expr::val(cutoff)));

        if let Some(scroll) = draft.scroll_percent {
            // 保留较大的滚动深度，NULL 视为未上报
            let keep_max = CaseStatement::new()
                .case(
                    Expr::col(engagement_record::Column::ScrollPercent)
                        .is_null()
                        .or(Expr::col(engagement_record::Column::ScrollPercent).lt(Expr::val(scroll))),
                    Expr::val(scroll),
                )
                .finally(Expr::col(engagement_record::Column::ScrollPercent));
            stmt.value(engagement_record::Column::ScrollPercent, keep_max);
        }

        let result = txn.execute(&stmt).await?;
        if result.rows_affected() > 0 {
            let merged = engagement_record::Entity::find_by_id(existing.id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    DbErr::RecordNotFound(format!("engagement record {}", existing.id))
                })?;
            txn.commit().await?;
            return Ok((merged, MergeOutcome::Merged));
        }

        debug!(
            "Engagement record {} left the merge window, inserting a new one",
            existing.id
        );
    }

    let active = draft_to_active_model(draft, now).map_err(|e| DbErr::Custom(e.to_string()))?;
    let inserted = engagement_record::Entity::insert(active).exec(&txn).await?;
    let created = engagement_record::Entity::find_by_id(inserted.last_insert_id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("engagement record {}", inserted.last_insert_id))
        })?;
    txn.commit().await?;

    Ok((created, MergeOutcome::Created))
}
