//! Category-based recommendation
//!
//! Picks the newest articles from the reader's top categories, skipping
//! anything the reader already has an engagement record for. No global
//! fallback: a reader without history gets nothing.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::EngagementConfig;
use crate::errors::{EngagementError, Result};
use crate::services::reading_stats::{ReadingStatsAggregator, UNKNOWN_CATEGORY};
use crate::storage::{ActivityKind, ArticleLookup, EngagementStore, RecommendationCandidate};

/// 推荐参数
#[derive(Debug, Clone, Copy)]
pub struct RecommenderSettings {
    /// 参与候选的分类数（宽于最终结果，给排除留余量）
    pub category_pool: usize,
    pub candidate_multiplier: usize,
    pub candidate_cap: usize,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            category_pool: 10,
            candidate_multiplier: 3,
            candidate_cap: 600,
        }
    }
}

impl From<&EngagementConfig> for RecommenderSettings {
    fn from(config: &EngagementConfig) -> Self {
        Self {
            category_pool: config.category_pool,
            candidate_multiplier: config.candidate_multiplier,
            candidate_cap: config.candidate_cap,
        }
    }
}

impl RecommenderSettings {
    /// min(limit * multiplier, cap)
    pub fn candidate_fetch_size(&self, limit: usize) -> usize {
        limit
            .saturating_mul(self.candidate_multiplier)
            .min(self.candidate_cap)
    }
}

pub struct CategoryRecommender {
    stats: Arc<ReadingStatsAggregator>,
    articles: Arc<dyn ArticleLookup>,
    records: Arc<dyn EngagementStore>,
    settings: RecommenderSettings,
}

impl CategoryRecommender {
    pub fn new(
        stats: Arc<ReadingStatsAggregator>,
        articles: Arc<dyn ArticleLookup>,
        records: Arc<dyn EngagementStore>,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            stats,
            articles,
            records,
            settings,
        }
    }

    pub async fn recommend(
        &self,
        reader_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationCandidate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // 多取一个分类：Unknown 桶对应的是无分类文章，不参与候选查询
        let pool = self.settings.category_pool;
        let categories: Vec<String> = match self
            .stats
            .top_categories(reader_id, pool.saturating_add(1))
            .await
        {
            Ok(top) => top
                .into_iter()
                .map(|c| c.category)
                .filter(|c| c != UNKNOWN_CATEGORY)
                .take(pool)
                .collect(),
            Err(EngagementError::StatsUnavailable(msg)) => {
                warn!(
                    "Reading stats unavailable for {}, no recommendations: {}",
                    reader_id, msg
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if categories.is_empty() {
            debug!("No known categories for {}, nothing to recommend", reader_id);
            return Ok(Vec::new());
        }

        let excluded: HashSet<String> = self
            .records
            .engaged_article_ids(reader_id)
            .await?
            .into_iter()
            .collect();

        let fetch_size = self.settings.candidate_fetch_size(limit);
        let candidates = self
            .articles
            .find_articles_by_categories(&categories, fetch_size as u64)
            .await?;
        let fetched = candidates.len();

        let picked: Vec<RecommendationCandidate> = candidates
            .into_iter()
            .filter(|article| !excluded.contains(&article.id))
            .take(limit)
            .map(RecommendationCandidate::from)
            .collect();

        debug!(
            "Recommend for {}: {} categories, {} excluded, {} fetched, {} returned",
            reader_id,
            categories.len(),
            excluded.len(),
            fetched,
            picked.len()
        );
        Ok(picked)
    }

    /// 最近读过 / 看过 / 点赞的文章 id，供外部排序服务作为上下文
    pub async fn recent_article_ids(&self, reader_id: &str, limit: usize) -> Result<Vec<String>> {
        self.records
            .recent_article_ids(reader_id, &ActivityKind::RECENT_CONTEXT, limit as u64)
            .await
    }
}
