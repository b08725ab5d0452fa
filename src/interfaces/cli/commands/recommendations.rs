//! Recommendation and click-through commands

use serde::Serialize;

use crate::interfaces::cli::{CliError, print_json};
use crate::services::{CATEGORY_RECOMMENDATION_KIND, EngagementEngine};
use crate::storage::{RecommendationCandidate, ServedCandidate};

#[derive(Serialize)]
struct ServedBatch {
    batch_id: Option<String>,
    recommendations: Vec<RecommendationCandidate>,
}

pub async fn recommend(
    engine: &EngagementEngine,
    reader_id: &str,
    limit: usize,
    log_batch: bool,
) -> Result<(), CliError> {
    let recommendations = engine.recommender().recommend(reader_id, limit).await?;

    let batch_id = if log_batch {
        let served: Vec<ServedCandidate> =
            recommendations.iter().map(ServedCandidate::from).collect();
        engine
            .auditor()
            .log_batch(reader_id, &served, CATEGORY_RECOMMENDATION_KIND, None)
            .await?
    } else {
        None
    };

    print_json(&ServedBatch {
        batch_id,
        recommendations,
    })
}

pub async fn analytics(
    engine: &EngagementEngine,
    days: u32,
    kind: Option<&str>,
) -> Result<(), CliError> {
    let report = engine.auditor().analytics(days, kind).await?;
    print_json(&report)
}
