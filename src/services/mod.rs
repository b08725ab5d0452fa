//! Service layer for engagement logic
//!
//! Each component receives the narrow storage traits it needs; `EngagementEngine`
//! builds them all from one storage handle.

pub mod activity_recorder;
pub mod category_recommender;
mod engine;
pub mod legacy_interactions;
pub mod reading_stats;
pub mod recommendation_auditor;

pub use activity_recorder::ActivityRecorder;
pub use category_recommender::{CategoryRecommender, RecommenderSettings};
pub use engine::EngagementEngine;
pub use legacy_interactions::{CategoryTime, LegacyBaseline, LegacyInteractionTracker};
pub use reading_stats::{
    CategoryStats, ReadingStatsAggregator, ReadingStatsSnapshot, UNKNOWN_CATEGORY, aggregate,
};
pub use recommendation_auditor::{
    CATEGORY_RECOMMENDATION_KIND, KindCtr, RecommendationAnalytics, RecommendationAuditor,
    ctr_percent,
};
