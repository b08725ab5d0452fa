//! Recommendation impression logging and click-through analytics

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::Result;
use crate::storage::{KindClickCounts, NewRecommendationLog, RecommendationLogStore, ServedCandidate};

/// 本地分类推荐写日志时使用的类型标记
pub const CATEGORY_RECOMMENDATION_KIND: &str = "category";

// ============ 公共类型定义 ============

/// 单个推荐类型的点击率
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindCtr {
    pub recommendation_kind: String,
    pub total: u64,
    pub clicked: u64,
    pub ctr_percent: f64,
}

impl From<KindClickCounts> for KindCtr {
    fn from(counts: KindClickCounts) -> Self {
        Self {
            ctr_percent: ctr_percent(counts.clicked, counts.total),
            recommendation_kind: counts.recommendation_kind,
            total: counts.total,
            clicked: counts.clicked,
        }
    }
}

/// 窗口内的推荐点击率汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationAnalytics {
    pub window_days: u32,
    pub total_recommendations: u64,
    pub clicked_recommendations: u64,
    pub overall_ctr_percent: f64,
    pub by_kind: Vec<KindCtr>,
}

/// clicked / total * 100，保留两位小数；total 为 0 时返回 0
pub fn ctr_percent(clicked: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = clicked as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

// ============ RecommendationAuditor ============

pub struct RecommendationAuditor {
    logs: Arc<dyn RecommendationLogStore>,
}

impl RecommendationAuditor {
    pub fn new(logs: Arc<dyn RecommendationLogStore>) -> Self {
        Self { logs }
    }

    /// 写入一批曝光日志，返回批次 id；空批次不写入
    pub async fn log_batch(
        &self,
        reader_id: &str,
        candidates: &[ServedCandidate],
        recommendation_kind: &str,
        context: Option<&Value>,
    ) -> Result<Option<String>> {
        self.log_batch_at(reader_id, candidates, recommendation_kind, context, Utc::now())
            .await
    }

    pub async fn log_batch_at(
        &self,
        reader_id: &str,
        candidates: &[ServedCandidate],
        recommendation_kind: &str,
        context: Option<&Value>,
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        if candidates.is_empty() {
            debug!("Empty recommendation batch for {}, nothing logged", reader_id);
            return Ok(None);
        }

        let context = match context {
            Some(Value::Null) | None => None,
            Some(value) => Some(serde_json::to_string(value)?),
        };
        let batch_id = Uuid::new_v4().to_string();

        let entries: Vec<NewRecommendationLog> = candidates
            .iter()
            .enumerate()
            .map(|(idx, candidate)| NewRecommendationLog {
                batch_id: batch_id.clone(),
                reader_id: reader_id.to_string(),
                article_id: candidate.article_id.clone(),
                recommendation_kind: recommendation_kind.to_string(),
                rank_position: i32::try_from(idx + 1).unwrap_or(i32::MAX),
                score: candidate.score(),
                context: context.clone(),
                created_at: now,
            })
            .collect();

        self.logs.insert_batch(entries).await?;
        info!(
            "Logged recommendation batch {} for {}: {} candidates ({})",
            batch_id,
            reader_id,
            candidates.len(),
            recommendation_kind
        );
        Ok(Some(batch_id))
    }

    /// 标记最近一条未点击的匹配曝光；没有匹配时返回 false
    pub async fn mark_clicked(
        &self,
        reader_id: &str,
        article_id: &str,
        recommendation_kind: &str,
    ) -> Result<bool> {
        self.mark_clicked_at(reader_id, article_id, recommendation_kind, Utc::now())
            .await
    }

    pub async fn mark_clicked_at(
        &self,
        reader_id: &str,
        article_id: &str,
        recommendation_kind: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let updated = self
            .logs
            .mark_latest_clicked(reader_id, article_id, recommendation_kind, now)
            .await?;
        if !updated {
            debug!(
                "Click without logged impression: {} -> {} ({})",
                reader_id, article_id, recommendation_kind
            );
        }
        Ok(updated)
    }

    pub async fn analytics(
        &self,
        window_days: u32,
        kind_filter: Option<&str>,
    ) -> Result<RecommendationAnalytics> {
        self.analytics_at(window_days, kind_filter, Utc::now()).await
    }

    pub async fn analytics_at(
        &self,
        window_days: u32,
        kind_filter: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<RecommendationAnalytics> {
        let since = now
            .checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let counts = self.logs.click_counts_by_kind(since, kind_filter).await?;

        let total: u64 = counts.iter().map(|c| c.total).sum();
        let clicked: u64 = counts.iter().map(|c| c.clicked).sum();

        Ok(RecommendationAnalytics {
            window_days,
            total_recommendations: total,
            clicked_recommendations: clicked,
            overall_ctr_percent: ctr_percent(clicked, total),
            by_kind: counts.into_iter().map(KindCtr::from).collect(),
        })
    }
}
