//! Narrow repository interfaces consumed by the engagement components
//!
//! Each component receives only the traits it needs as `Arc<dyn Trait>`,
//! built once at startup. `SeaOrmStorage` implements all of them.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::errors::Result;
use crate::storage::models::{
    ActivityExportRow, ActivityKind, Article, CategorizedEngagement, EngagementDraft,
    InteractionTotals, KindClickCounts, LegacyInteraction, NewRecommendationLog, RecordOutcome,
};

/// 读者存在性检查
#[async_trait]
pub trait ReaderDirectory: Send + Sync {
    async fn reader_exists(&self, reader_id: &str) -> Result<bool>;
}

/// 文章查找
#[async_trait]
pub trait ArticleLookup: Send + Sync {
    async fn find_article(&self, article_id: &str) -> Result<Option<Article>>;

    /// 指定分类下的文章，按发布时间倒序（同一时间保持存储顺序）
    async fn find_articles_by_categories(
        &self,
        categories: &[String],
        limit: u64,
    ) -> Result<Vec<Article>>;
}

/// 阅读行为记录存储
#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// 原子地合并进窗口内最新的匹配记录，没有则新建
    ///
    /// 匹配条件：相同 (reader, article, kind) 且 `last_merged_at >= now - window`。
    async fn merge_or_insert(
        &self,
        draft: &EngagementDraft,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<RecordOutcome>;

    /// `created_at >= since` 的记录及其文章分类，按首次出现顺序
    async fn categorized_since(
        &self,
        reader_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CategorizedEngagement>>;

    /// 读者有过任意记录的文章 id（排除集）
    async fn engaged_article_ids(&self, reader_id: &str) -> Result<Vec<String>>;

    /// 最近的文章 id（去重，新到旧）
    async fn recent_article_ids(
        &self,
        reader_id: &str,
        kinds: &[ActivityKind],
        limit: u64,
    ) -> Result<Vec<String>>;

    async fn export_activities(
        &self,
        reader_id: Option<&str>,
        limit: u64,
    ) -> Result<Vec<ActivityExportRow>>;
}

/// 推荐曝光日志存储
#[async_trait]
pub trait RecommendationLogStore: Send + Sync {
    /// 一次调用写入整批，要么全部成功要么整体失败
    async fn insert_batch(&self, entries: Vec<NewRecommendationLog>) -> Result<()>;

    /// 将最新的一条未点击匹配记录标记为已点击，返回是否有记录被更新
    async fn mark_latest_clicked(
        &self,
        reader_id: &str,
        article_id: &str,
        recommendation_kind: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// `created_at >= since` 的曝光 / 点击计数，按推荐类型分组
    async fn click_counts_by_kind(
        &self,
        since: DateTime<Utc>,
        kind_filter: Option<&str>,
    ) -> Result<Vec<KindClickCounts>>;
}

/// 旧版交互表
#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn find_interaction(
        &self,
        profile_id: &str,
        article_id: &str,
    ) -> Result<Option<LegacyInteraction>>;

    async fn insert_interaction(
        &self,
        profile_id: &str,
        article_id: &str,
        totals: &InteractionTotals,
        now: DateTime<Utc>,
    ) -> Result<LegacyInteraction>;

    /// 写入类型化累计值并清空旧 note
    async fn save_interaction_totals(
        &self,
        interaction_id: i64,
        totals: &InteractionTotals,
        now: DateTime<Utc>,
    ) -> Result<LegacyInteraction>;

    async fn interactions_for_profile(&self, profile_id: &str) -> Result<Vec<LegacyInteraction>>;
}
