//! Engagement and reading-statistics commands

use serde::Serialize;

use crate::interfaces::cli::{CliError, print_json};
use crate::services::EngagementEngine;
use crate::storage::{ActivityKind, EngagementSignals};

pub async fn track(
    engine: &EngagementEngine,
    reader_id: &str,
    article_id: &str,
    kind: ActivityKind,
    duration: f64,
    scroll: Option<f64>,
    recommendation_kind: Option<String>,
) -> Result<(), CliError> {
    let mut signals = EngagementSignals::default().with_duration(duration);
    signals.scroll_percent = scroll;
    if let Some(recommendation_kind) = recommendation_kind {
        signals = signals.from_recommendation(recommendation_kind);
    }

    let outcome = engine
        .track(reader_id, article_id, kind, &signals)
        .await?;
    print_json(&outcome)
}

pub async fn stats(engine: &EngagementEngine, reader_id: &str, days: u32) -> Result<(), CliError> {
    let snapshot = engine.stats().compute(reader_id, days).await?;
    print_json(&snapshot)
}

pub async fn top_categories(
    engine: &EngagementEngine,
    reader_id: &str,
    limit: usize,
) -> Result<(), CliError> {
    let top = engine.stats().top_categories(reader_id, limit).await?;
    print_json(&top)
}

#[derive(Serialize)]
struct RecentArticles<'a> {
    reader_id: &'a str,
    kinds: [ActivityKind; 3],
    article_ids: Vec<String>,
}

pub async fn recent(engine: &EngagementEngine, reader_id: &str, limit: usize) -> Result<(), CliError> {
    let article_ids = engine
        .recommender()
        .recent_article_ids(reader_id, limit)
        .await?;
    print_json(&RecentArticles {
        reader_id,
        kinds: ActivityKind::RECENT_CONTEXT,
        article_ids,
    })
}

pub async fn export_activities(
    engine: &EngagementEngine,
    reader_id: Option<&str>,
    limit: u64,
) -> Result<(), CliError> {
    let rows = engine.stats().export_activities(reader_id, limit).await?;
    print_json(&rows)
}
