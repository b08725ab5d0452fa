//! Legacy per-(profile, article) interaction tracking
//!
//! Older rows keep their accumulated time and visit count in a JSON `note`
//! instead of typed columns. Reading such a row goes through
//! [`LegacyBaseline`]; a note that does not decode is treated as a zero
//! baseline. Every write stores typed columns and clears the note.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{EngagementError, Result};
use crate::storage::{
    ArticleLookup, InteractionStore, InteractionTotals, LegacyInteraction, ReaderDirectory,
    normalize_duration,
};

/// note 中的旧字段
#[derive(Debug, Deserialize)]
struct LegacyNote {
    #[serde(default)]
    time_spent_seconds: Option<f64>,
    #[serde(default)]
    visits: Option<f64>,
    #[serde(default)]
    category: Option<String>,
}

/// 一行旧交互记录的累计起点
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyBaseline {
    /// 类型化列已有值
    Typed(InteractionTotals),
    /// 从 note 解出
    Decoded(InteractionTotals),
    /// 没有任何累计值
    Missing,
    /// note 无法解析，按 0 处理
    Corrupted(String),
}

impl LegacyBaseline {
    pub fn resolve(row: &LegacyInteraction) -> Self {
        if row.time_spent_seconds.is_some() || row.visits.is_some() {
            return LegacyBaseline::Typed(InteractionTotals {
                time_spent_seconds: row.time_spent_seconds.unwrap_or(0).max(0),
                visits: row.visits.unwrap_or(0).max(0),
                category: row.category.clone(),
            });
        }

        let Some(note) = row.note.as_deref().filter(|n| !n.trim().is_empty()) else {
            return LegacyBaseline::Missing;
        };

        match serde_json::from_str::<LegacyNote>(note) {
            Ok(decoded) => LegacyBaseline::Decoded(InteractionTotals {
                time_spent_seconds: decoded.time_spent_seconds.map_or(0, normalize_duration),
                visits: decoded.visits.map_or(0, normalize_duration),
                category: row.category.clone().or(decoded.category),
            }),
            Err(e) => LegacyBaseline::Corrupted(e.to_string()),
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, LegacyBaseline::Corrupted(_))
    }

    /// Missing / Corrupted 都返回全 0
    pub fn totals(&self) -> InteractionTotals {
        match self {
            LegacyBaseline::Typed(totals) | LegacyBaseline::Decoded(totals) => totals.clone(),
            LegacyBaseline::Missing | LegacyBaseline::Corrupted(_) => InteractionTotals::default(),
        }
    }
}

/// 分类累计时长
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTime {
    pub category: String,
    pub time_spent_seconds: i64,
}

pub struct LegacyInteractionTracker {
    readers: Arc<dyn ReaderDirectory>,
    articles: Arc<dyn ArticleLookup>,
    interactions: Arc<dyn InteractionStore>,
}

impl LegacyInteractionTracker {
    pub fn new(
        readers: Arc<dyn ReaderDirectory>,
        articles: Arc<dyn ArticleLookup>,
        interactions: Arc<dyn InteractionStore>,
    ) -> Self {
        Self {
            readers,
            articles,
            interactions,
        }
    }

    pub async fn track(
        &self,
        profile_id: &str,
        article_id: &str,
        seconds: f64,
        category: Option<&str>,
    ) -> Result<LegacyInteraction> {
        self.track_at(profile_id, article_id, seconds, category, Utc::now())
            .await
    }

    pub async fn track_at(
        &self,
        profile_id: &str,
        article_id: &str,
        seconds: f64,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<LegacyInteraction> {
        if !self.readers.reader_exists(profile_id).await? {
            return Err(EngagementError::reader_not_found(profile_id));
        }
        let Some(article) = self.articles.find_article(article_id).await? else {
            return Err(EngagementError::article_not_found(article_id));
        };

        let seconds = normalize_duration(seconds);
        let category = category
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string);

        let Some(existing) = self
            .interactions
            .find_interaction(profile_id, article_id)
            .await?
        else {
            let totals = InteractionTotals {
                time_spent_seconds: seconds,
                visits: 1,
                category: category.or(article.category),
            };
            let created = self
                .interactions
                .insert_interaction(profile_id, article_id, &totals, now)
                .await?;
            info!(
                "Interaction created for {} on {}: {}s",
                profile_id, article_id, seconds
            );
            return Ok(created);
        };

        let baseline = LegacyBaseline::resolve(&existing);
        if let LegacyBaseline::Corrupted(reason) = &baseline {
            warn!(
                "Corrupted interaction note on row {} ({} / {}), restarting from zero: {}",
                existing.id, profile_id, article_id, reason
            );
        }

        let previous = baseline.totals();
        let totals = InteractionTotals {
            time_spent_seconds: previous.time_spent_seconds.saturating_add(seconds),
            visits: previous.visits.saturating_add(1),
            category: category.or(previous.category).or(article.category),
        };
        let saved = self
            .interactions
            .save_interaction_totals(existing.id, &totals, now)
            .await?;

        info!(
            "Interaction updated for {} on {}: {}s over {} visits",
            profile_id, article_id, totals.time_spent_seconds, totals.visits
        );
        Ok(saved)
    }

    /// 按分类累计时长倒序；无分类或 note 损坏的行跳过
    pub async fn top_categories(&self, profile_id: &str, limit: usize) -> Result<Vec<CategoryTime>> {
        let rows = self.interactions.interactions_for_profile(profile_id).await?;

        let mut totals: Vec<CategoryTime> = Vec::new();
        for row in &rows {
            let baseline = LegacyBaseline::resolve(row);
            if baseline.is_corrupted() {
                continue;
            }
            let InteractionTotals {
                time_spent_seconds,
                category: Some(category),
                ..
            } = baseline.totals()
            else {
                continue;
            };

            match totals.iter_mut().find(|t| t.category == category) {
                Some(entry) => {
                    entry.time_spent_seconds =
                        entry.time_spent_seconds.saturating_add(time_spent_seconds)
                }
                None => totals.push(CategoryTime {
                    category,
                    time_spent_seconds,
                }),
            }
        }

        totals.sort_by(|a, b| b.time_spent_seconds.cmp(&a.time_spent_seconds));
        totals.truncate(limit);
        Ok(totals)
    }
}
