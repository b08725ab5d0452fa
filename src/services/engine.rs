//! Engagement engine
//!
//! Wires the recorder, stats aggregator, recommender, auditor and legacy
//! tracker to one storage handle at startup. Callers (the CLI, or an HTTP
//! layer embedding the library) hold a single `EngagementEngine`.

use std::sync::Arc;

use tracing::warn;

use crate::config::StaticConfig;
use crate::errors::Result;
use crate::services::activity_recorder::ActivityRecorder;
use crate::services::category_recommender::{CategoryRecommender, RecommenderSettings};
use crate::services::legacy_interactions::LegacyInteractionTracker;
use crate::services::reading_stats::ReadingStatsAggregator;
use crate::services::recommendation_auditor::RecommendationAuditor;
use crate::storage::{ActivityKind, EngagementSignals, RecordOutcome, SeaOrmStorage};

pub struct EngagementEngine {
    recorder: ActivityRecorder,
    stats: Arc<ReadingStatsAggregator>,
    recommender: CategoryRecommender,
    auditor: RecommendationAuditor,
    legacy: LegacyInteractionTracker,
}

impl EngagementEngine {
    pub fn new(storage: Arc<SeaOrmStorage>, config: &StaticConfig) -> Self {
        let stats = Arc::new(ReadingStatsAggregator::new(
            storage.clone(),
            config.engagement.stats_window_days,
        ));

        Self {
            recorder: ActivityRecorder::new(
                storage.clone(),
                storage.clone(),
                storage.clone(),
                config.engagement.merge_window(),
            ),
            recommender: CategoryRecommender::new(
                stats.clone(),
                storage.clone(),
                storage.clone(),
                RecommenderSettings::from(&config.engagement),
            ),
            auditor: RecommendationAuditor::new(storage.clone()),
            legacy: LegacyInteractionTracker::new(storage.clone(), storage.clone(), storage),
            stats,
        }
    }

    pub fn recorder(&self) -> &ActivityRecorder {
        &self.recorder
    }

    pub fn stats(&self) -> &ReadingStatsAggregator {
        &self.stats
    }

    pub fn recommender(&self) -> &CategoryRecommender {
        &self.recommender
    }

    pub fn auditor(&self) -> &RecommendationAuditor {
        &self.auditor
    }

    pub fn legacy(&self) -> &LegacyInteractionTracker {
        &self.legacy
    }

    /// 记录行为；来自推荐位的行为顺带核销对应曝光
    ///
    /// 核销失败只记日志，不影响行为本身的记录结果。
    pub async fn track(
        &self,
        reader_id: &str,
        article_id: &str,
        kind: ActivityKind,
        signals: &EngagementSignals,
    ) -> Result<RecordOutcome> {
        let outcome = self
            .recorder
            .record(reader_id, article_id, kind, signals)
            .await?;

        if let Some(recommendation_kind) = signals.effective_recommendation_kind()
            && let Err(e) = self
                .auditor
                .mark_clicked(reader_id, article_id, recommendation_kind)
                .await
        {
            warn!(
                "Failed to reconcile recommendation click {} -> {} ({}): {}",
                reader_id, article_id, recommendation_kind, e
            );
        }

        Ok(outcome)
    }
}
