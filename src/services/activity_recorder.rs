//! Activity recording
//!
//! Ingests one engagement signal for a (reader, article, kind) triple and
//! folds it into the record still inside the merge window, or starts a new
//! one. Reader and article existence is a hard precondition.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::errors::{EngagementError, Result};
use crate::storage::{
    ActivityKind, ArticleLookup, EngagementDraft, EngagementSignals, EngagementStore,
    ReaderDirectory, RecordOutcome,
};

/// 阅读行为记录器
pub struct ActivityRecorder {
    readers: Arc<dyn ReaderDirectory>,
    articles: Arc<dyn ArticleLookup>,
    records: Arc<dyn EngagementStore>,
    merge_window: Duration,
}

impl ActivityRecorder {
    pub fn new(
        readers: Arc<dyn ReaderDirectory>,
        articles: Arc<dyn ArticleLookup>,
        records: Arc<dyn EngagementStore>,
        merge_window: Duration,
    ) -> Self {
        Self {
            readers,
            articles,
            records,
            merge_window,
        }
    }

    pub fn merge_window(&self) -> Duration {
        self.merge_window
    }

    /// 记录一次行为（以当前时间为准）
    pub async fn record(
        &self,
        reader_id: &str,
        article_id: &str,
        kind: ActivityKind,
        signals: &EngagementSignals,
    ) -> Result<RecordOutcome> {
        self.record_at(reader_id, article_id, kind, signals, Utc::now())
            .await
    }

    /// 以指定时间记录一次行为
    pub async fn record_at(
        &self,
        reader_id: &str,
        article_id: &str,
        kind: ActivityKind,
        signals: &EngagementSignals,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        if !self.readers.reader_exists(reader_id).await? {
            return Err(EngagementError::reader_not_found(reader_id));
        }
        if self.articles.find_article(article_id).await?.is_none() {
            return Err(EngagementError::article_not_found(article_id));
        }

        let draft = EngagementDraft::from_signals(reader_id, article_id, kind, signals);
        let outcome = self
            .records
            .merge_or_insert(&draft, now, self.merge_window)
            .await?;

        info!(
            "Engagement {} for {} on {} ({}): record {} now {}s",
            if outcome.was_merged() { "merged" } else { "created" },
            reader_id,
            article_id,
            kind,
            outcome.record.id,
            outcome.record.duration_seconds
        );
        Ok(outcome)
    }
}
