//! Reading statistics
//!
//! Derives per-category totals, distinct-article counts and averages from a
//! reader's engagement records in a trailing window. Nothing is cached; every
//! call reads fresh rows.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::errors::{EngagementError, Result};
use crate::storage::{ActivityExportRow, CategorizedEngagement, EngagementStore};

/// 无分类文章的归类桶
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// ============ 公共类型定义 ============

/// 单个分类的统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub article_count: u64,
    pub total_duration_seconds: i64,
    pub average_duration_seconds: f64,
}

/// 读者在一个时间窗口内的阅读统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingStatsSnapshot {
    pub reader_id: String,
    pub window_days: u32,
    pub total_distinct_articles: u64,
    pub total_duration_seconds: i64,
    pub average_duration_per_article: f64,
    /// 按总时长倒序，时长相同保持首次出现顺序
    pub per_category: Vec<CategoryStats>,
}

impl ReadingStatsSnapshot {
    pub fn empty(reader_id: &str, window_days: u32) -> Self {
        Self {
            reader_id: reader_id.to_string(),
            window_days,
            total_distinct_articles: 0,
            total_duration_seconds: 0,
            average_duration_per_article: 0.0,
            per_category: Vec::new(),
        }
    }
}

struct CategoryBucket<'a> {
    category: &'a str,
    articles: HashSet<&'a str>,
    total_duration: i64,
}

fn average(total: i64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// 纯聚合：输入行按首次出现顺序给出
pub fn aggregate(
    reader_id: &str,
    window_days: u32,
    rows: &[CategorizedEngagement],
) -> ReadingStatsSnapshot {
    let mut buckets: Vec<CategoryBucket<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut distinct_articles: HashSet<&str> = HashSet::new();
    let mut total_duration: i64 = 0;

    for row in rows {
        let category = row.category.as_deref().unwrap_or(UNKNOWN_CATEGORY);
        let slot = *index.entry(category).or_insert_with(|| {
            buckets.push(CategoryBucket {
                category,
                articles: HashSet::new(),
                total_duration: 0,
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.articles.insert(row.article_id.as_str());
        bucket.total_duration = bucket.total_duration.saturating_add(row.duration_seconds);

        distinct_articles.insert(row.article_id.as_str());
        total_duration = total_duration.saturating_add(row.duration_seconds);
    }

    let mut per_category: Vec<CategoryStats> = buckets
        .into_iter()
        .filter(|b| !b.articles.is_empty())
        .map(|b| CategoryStats {
            category: b.category.to_string(),
            article_count: b.articles.len() as u64,
            total_duration_seconds: b.total_duration,
            average_duration_seconds: average(b.total_duration, b.articles.len()),
        })
        .collect();
    // sort_by 是稳定排序，相同时长保持首次出现顺序
    per_category.sort_by(|a, b| b.total_duration_seconds.cmp(&a.total_duration_seconds));

    ReadingStatsSnapshot {
        reader_id: reader_id.to_string(),
        window_days,
        total_distinct_articles: distinct_articles.len() as u64,
        total_duration_seconds: total_duration,
        average_duration_per_article: average(total_duration, distinct_articles.len()),
        per_category,
    }
}

// ============ ReadingStatsAggregator ============

/// 阅读统计聚合器
pub struct ReadingStatsAggregator {
    records: Arc<dyn EngagementStore>,
    default_window_days: u32,
}

impl ReadingStatsAggregator {
    pub fn new(records: Arc<dyn EngagementStore>, default_window_days: u32) -> Self {
        Self {
            records,
            default_window_days,
        }
    }

    pub fn default_window_days(&self) -> u32 {
        self.default_window_days
    }

    pub async fn compute(&self, reader_id: &str, window_days: u32) -> Result<ReadingStatsSnapshot> {
        self.compute_at(reader_id, window_days, Utc::now()).await
    }

    /// 统计 `created_at >= now - window_days` 的记录
    pub async fn compute_at(
        &self,
        reader_id: &str,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<ReadingStatsSnapshot> {
        if window_days == 0 {
            return Ok(ReadingStatsSnapshot::empty(reader_id, window_days));
        }

        let since = now
            .checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let rows = self
            .records
            .categorized_since(reader_id, since)
            .await
            .map_err(|e| EngagementError::stats_unavailable(e.message().to_string()))?;

        debug!(
            "Reading stats for {}: {} records in the last {} days",
            reader_id,
            rows.len(),
            window_days
        );
        Ok(aggregate(reader_id, window_days, &rows))
    }

    /// 默认窗口下的前 `limit` 个分类
    pub async fn top_categories(&self, reader_id: &str, limit: usize) -> Result<Vec<CategoryStats>> {
        let snapshot = self.compute(reader_id, self.default_window_days).await?;
        Ok(snapshot.per_category.into_iter().take(limit).collect())
    }

    /// 导出行为数据，供外部训练任务使用
    pub async fn export_activities(
        &self,
        reader_id: Option<&str>,
        limit: u64,
    ) -> Result<Vec<ActivityExportRow>> {
        self.records.export_activities(reader_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(article: &str, category: Option<&str>, duration: i64) -> CategorizedEngagement {
        CategorizedEngagement {
            article_id: article.to_string(),
            category: category.map(str::to_string),
            duration_seconds: duration,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let snapshot = aggregate("r1", 30, &[]);
        assert_eq!(snapshot, ReadingStatsSnapshot::empty("r1", 30));
    }

    #[test]
    fn test_aggregate_groups_and_averages() {
        let rows = vec![
            row("a1", Some("tech"), 60),
            row("a2", Some("tech"), 30),
            row("a3", Some("sport"), 10),
            // 同一文章不同 kind 也会累计
            row("a1", Some("tech"), 30),
        ];
        let snapshot = aggregate("r1", 30, &rows);

        assert_eq!(snapshot.total_distinct_articles, 3);
        assert_eq!(snapshot.total_duration_seconds, 130);
        assert!((snapshot.average_duration_per_article - 130.0 / 3.0).abs() < 1e-9);

        let tech = &snapshot.per_category[0];
        assert_eq!(tech.category, "tech");
        assert_eq!(tech.article_count, 2);
        assert_eq!(tech.total_duration_seconds, 120);
        assert!((tech.average_duration_seconds - 60.0).abs() < 1e-9);

        let sport = &snapshot.per_category[1];
        assert_eq!(sport.category, "sport");
        assert_eq!(sport.article_count, 1);
    }

    #[test]
    fn test_missing_category_goes_to_unknown() {
        let snapshot = aggregate("r1", 7, &[row("a1", None, 5), row("a2", None, 7)]);
        assert_eq!(snapshot.per_category.len(), 1);
        assert_eq!(snapshot.per_category[0].category, UNKNOWN_CATEGORY);
        assert_eq!(snapshot.per_category[0].article_count, 2);
    }

    #[test]
    fn test_ties_keep_first_observation_order() {
        let rows = vec![
            row("a1", Some("music"), 20),
            row("a2", Some("world"), 20),
            row("a3", Some("local"), 50),
            row("a4", Some("arts"), 20),
        ];
        let names: Vec<String> = aggregate("r1", 7, &rows)
            .per_category
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(names, vec!["local", "music", "world", "arts"]);
    }

    #[test]
    fn test_zero_duration_category_still_listed() {
        let snapshot = aggregate("r1", 7, &[row("a1", Some("tech"), 0)]);
        assert_eq!(snapshot.per_category.len(), 1);
        assert_eq!(snapshot.per_category[0].average_duration_seconds, 0.0);
    }
}
