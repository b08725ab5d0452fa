use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 渠道标记：来自推荐位的点击
pub const RECOMMENDATION_CHANNEL: &str = "recommendation";

/// 默认来源渠道
pub const DEFAULT_SOURCE_CHANNEL: &str = "app";

/// 阅读行为类型
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActivityKind {
    #[default]
    View,
    Read,
    Like,
    Bookmark,
    Click,
    Share,
}

impl ActivityKind {
    /// Kinds that count as "recently read" context for the external ranker
    pub const RECENT_CONTEXT: [ActivityKind; 3] =
        [ActivityKind::Read, ActivityKind::View, ActivityKind::Like];
}

/// 时长四舍五入并截断到 >= 0，非有限值按 0 处理
pub fn normalize_duration(seconds: f64) -> i64 {
    if !seconds.is_finite() {
        return 0;
    }
    let rounded = seconds.round();
    if rounded <= 0.0 {
        0
    } else if rounded >= i64::MAX as f64 {
        i64::MAX
    } else {
        rounded as i64
    }
}

/// 客户端上报的一次行为信号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementSignals {
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub scroll_percent: Option<f64>,
    #[serde(default = "default_source_channel")]
    pub source_channel: String,
    #[serde(default)]
    pub recommendation_kind: Option<String>,
    #[serde(default)]
    pub extra: Map<String, Value>,
}

fn default_source_channel() -> String {
    DEFAULT_SOURCE_CHANNEL.to_string()
}

impl Default for EngagementSignals {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            scroll_percent: None,
            source_channel: default_source_channel(),
            recommendation_kind: None,
            extra: Map::new(),
        }
    }
}

impl EngagementSignals {
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn with_scroll(mut self, percent: f64) -> Self {
        self.scroll_percent = Some(percent);
        self
    }

    pub fn with_extra<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Mark the signal as a click on a served recommendation
    pub fn from_recommendation<K: Into<String>>(mut self, kind: K) -> Self {
        self.source_channel = RECOMMENDATION_CHANNEL.to_string();
        self.recommendation_kind = Some(kind.into());
        self
    }

    pub fn normalized_duration(&self) -> i64 {
        normalize_duration(self.duration_seconds)
    }

    /// 滚动百分比截断到 [0, 100]
    pub fn normalized_scroll(&self) -> Option<f64> {
        self.scroll_percent
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0))
    }

    pub fn is_recommendation_click(&self) -> bool {
        self.source_channel == RECOMMENDATION_CHANNEL
    }

    /// recommendation_kind 只在来源为推荐位时保留
    pub fn effective_recommendation_kind(&self) -> Option<&str> {
        if self.is_recommendation_click() {
            self.recommendation_kind.as_deref().filter(|k| !k.is_empty())
        } else {
            None
        }
    }

    pub fn source_channel_or_default(&self) -> &str {
        if self.source_channel.trim().is_empty() {
            DEFAULT_SOURCE_CHANNEL
        } else {
            &self.source_channel
        }
    }
}

/// 写入存储前的规范化记录
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementDraft {
    pub reader_id: String,
    pub article_id: String,
    pub kind: ActivityKind,
    pub duration_seconds: i64,
    pub scroll_percent: Option<f64>,
    pub source_channel: String,
    pub recommendation_kind: Option<String>,
    pub extra: Map<String, Value>,
}

impl EngagementDraft {
    pub fn from_signals(
        reader_id: &str,
        article_id: &str,
        kind: ActivityKind,
        signals: &EngagementSignals,
    ) -> Self {
        Self {
            reader_id: reader_id.to_string(),
            article_id: article_id.to_string(),
            kind,
            duration_seconds: signals.normalized_duration(),
            scroll_percent: signals.normalized_scroll(),
            source_channel: signals.source_channel_or_default().to_string(),
            recommendation_kind: signals.effective_recommendation_kind().map(str::to_string),
            extra: signals.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementRecord {
    pub id: i64,
    pub reader_id: String,
    pub article_id: String,
    pub kind: ActivityKind,
    pub duration_seconds: i64,
    pub scroll_percent: Option<f64>,
    pub source_channel: String,
    pub recommendation_kind: Option<String>,
    pub extra: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub last_merged_at: DateTime<Utc>,
}

/// 记录是合并进已有行还是新建
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeOutcome {
    Merged,
    Created,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    pub record: EngagementRecord,
    pub outcome: MergeOutcome,
}

impl RecordOutcome {
    pub fn was_merged(&self) -> bool {
        self.outcome == MergeOutcome::Merged
    }
}

/// 统计用的行：一条行为记录 + 文章分类
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedEngagement {
    pub article_id: String,
    pub category: Option<String>,
    pub duration_seconds: i64,
}

/// 训练数据导出行
#[derive(Debug, Clone, Serialize)]
pub struct ActivityExportRow {
    pub reader_id: String,
    pub article_id: String,
    pub kind: ActivityKind,
    pub duration_seconds: i64,
    pub scroll_percent: f64,
    pub category: Option<String>,
    pub place: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub place: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// 推荐结果的读模型投影
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCandidate {
    pub article_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub published_at: DateTime<Utc>,
    pub url: String,
}

impl From<Article> for RecommendationCandidate {
    fn from(article: Article) -> Self {
        Self {
            article_id: article.id,
            title: article.title,
            summary: article.summary,
            image_url: article.image_url,
            category: article.category,
            published_at: article.published_at,
            url: article.url,
        }
    }
}

/// 下发给读者的一条推荐（来自本地分类推荐或外部排序服务）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServedCandidate {
    pub article_id: String,
    #[serde(default)]
    pub similarity_score: Option<f64>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub hybrid_score: Option<f64>,
}

impl ServedCandidate {
    pub fn new<T: Into<String>>(article_id: T) -> Self {
        Self {
            article_id: article_id.into(),
            ..Default::default()
        }
    }

    /// similarity > relevance > hybrid，取第一个存在的分数
    pub fn score(&self) -> Option<f64> {
        self.similarity_score
            .or(self.relevance_score)
            .or(self.hybrid_score)
    }
}

impl From<&RecommendationCandidate> for ServedCandidate {
    fn from(candidate: &RecommendationCandidate) -> Self {
        Self::new(candidate.article_id.clone())
    }
}

/// 批量写入的推荐日志行
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendationLog {
    pub batch_id: String,
    pub reader_id: String,
    pub article_id: String,
    pub recommendation_kind: String,
    pub rank_position: i32,
    pub score: Option<f64>,
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 按推荐类型聚合的曝光 / 点击计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindClickCounts {
    pub recommendation_kind: String,
    pub total: u64,
    pub clicked: u64,
}

/// 旧版交互行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyInteraction {
    pub id: i64,
    pub profile_id: String,
    pub article_id: String,
    pub time_spent_seconds: Option<i64>,
    pub visits: Option<i64>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub interaction_at: DateTime<Utc>,
}

/// 旧版交互的累计值（类型化列）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionTotals {
    pub time_spent_seconds: i64,
    pub visits: i64,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_activity_kind_string_forms() {
        for kind in ActivityKind::iter() {
            let parsed = ActivityKind::from_str(&kind.to_string()).unwrap();
            assert_eq!(parsed, kind);
        }
        assert_eq!(ActivityKind::from_str("READ").unwrap(), ActivityKind::Read);
        assert!(ActivityKind::from_str("hover").is_err());
        assert_eq!(ActivityKind::Bookmark.to_string(), "bookmark");
    }

    #[test]
    fn test_duration_rounding_and_clamp() {
        let s = EngagementSignals::default();
        assert_eq!(s.clone().with_duration(30.5).normalized_duration(), 31);
        assert_eq!(s.clone().with_duration(29.4).normalized_duration(), 29);
        assert_eq!(s.clone().with_duration(-12.0).normalized_duration(), 0);
        assert_eq!(s.clone().with_duration(f64::NAN).normalized_duration(), 0);
        assert_eq!(s.with_duration(f64::INFINITY).normalized_duration(), 0);
    }

    #[test]
    fn test_scroll_clamp() {
        let s = EngagementSignals::default();
        assert_eq!(s.normalized_scroll(), None);
        assert_eq!(s.clone().with_scroll(140.0).normalized_scroll(), Some(100.0));
        assert_eq!(s.clone().with_scroll(-3.0).normalized_scroll(), Some(0.0));
        assert_eq!(s.with_scroll(f64::NAN).normalized_scroll(), None);
    }

    #[test]
    fn test_recommendation_kind_only_kept_for_recommendation_channel() {
        let mut s = EngagementSignals::default();
        s.recommendation_kind = Some("hybrid".to_string());
        assert_eq!(s.effective_recommendation_kind(), None);

        let s = EngagementSignals::default().from_recommendation("hybrid");
        assert_eq!(s.effective_recommendation_kind(), Some("hybrid"));

        let s = EngagementSignals::default().from_recommendation("");
        assert_eq!(s.effective_recommendation_kind(), None);
    }

    #[test]
    fn test_blank_source_channel_falls_back_to_app() {
        let mut s = EngagementSignals::default();
        s.source_channel = "  ".to_string();
        let draft = EngagementDraft::from_signals("r", "a", ActivityKind::View, &s);
        assert_eq!(draft.source_channel, DEFAULT_SOURCE_CHANNEL);
    }

    #[test]
    fn test_served_candidate_score_priority() {
        let mut c = ServedCandidate::new("a1");
        assert_eq!(c.score(), None);

        c.hybrid_score = Some(0.3);
        assert_eq!(c.score(), Some(0.3));

        c.relevance_score = Some(0.5);
        assert_eq!(c.score(), Some(0.5));

        c.similarity_score = Some(0.0);
        assert_eq!(c.score(), Some(0.0));
    }

    #[test]
    fn test_signals_deserialize_defaults() {
        let s: EngagementSignals = serde_json::from_str(r#"{"duration_seconds": 12}"#).unwrap();
        assert_eq!(s.source_channel, "app");
        assert!(s.extra.is_empty());
        assert_eq!(s.normalized_duration(), 12);
    }
}
