//! EngagementEngine wiring tests

mod common;

use readpulse::config::get_config;
use readpulse::services::{CATEGORY_RECOMMENDATION_KIND, EngagementEngine};
use readpulse::storage::{ActivityKind, EngagementSignals, ServedCandidate};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{base_time, create_temp_storage, seed_article, seed_reader};
use migration::entities::recommendation_log;

#[tokio::test]
async fn test_recommendation_click_reconciles_impression() {
    let (storage, _dir) = create_temp_storage().await;
    seed_reader(&storage, "reader-1").await;
    seed_article(&storage, "article-1", Some("tech"), base_time()).await;
    seed_article(&storage, "article-2", Some("tech"), base_time()).await;

    let engine = EngagementEngine::new(storage.clone(), &get_config());
    let served = vec![
        ServedCandidate::new("article-1"),
        ServedCandidate::new("article-2"),
    ];
    engine
        .auditor()
        .log_batch("reader-1", &served, CATEGORY_RECOMMENDATION_KIND, None)
        .await
        .unwrap();

    let outcome = engine
        .track(
            "reader-1",
            "article-2",
            ActivityKind::Click,
            &EngagementSignals::default().from_recommendation(CATEGORY_RECOMMENDATION_KIND),
        )
        .await
        .unwrap();
    assert_eq!(
        outcome.record.recommendation_kind.as_deref(),
        Some(CATEGORY_RECOMMENDATION_KIND)
    );

    let clicked = recommendation_log::Entity::find()
        .filter(recommendation_log::Column::WasClicked.eq(true))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(clicked.len(), 1);
    assert_eq!(clicked[0].article_id, "article-2");

    let report = engine.auditor().analytics(7, None).await.unwrap();
    assert_eq!(report.total_recommendations, 2);
    assert_eq!(report.overall_ctr_percent, 50.0);
}

#[tokio::test]
async fn test_organic_track_leaves_impressions_alone() {
    let (storage, _dir) = create_temp_storage().await;
    seed_reader(&storage, "reader-1").await;
    seed_article(&storage, "article-1", Some("tech"), base_time()).await;

    let engine = EngagementEngine::new(storage.clone(), &get_config());
    engine
        .auditor()
        .log_batch(
            "reader-1",
            &[ServedCandidate::new("article-1")],
            CATEGORY_RECOMMENDATION_KIND,
            None,
        )
        .await
        .unwrap();

    let mut signals = EngagementSignals::default().with_duration(40.0);
    signals.recommendation_kind = Some(CATEGORY_RECOMMENDATION_KIND.to_string());
    engine
        .track("reader-1", "article-1", ActivityKind::Read, &signals)
        .await
        .unwrap();

    let clicked = recommendation_log::Entity::find()
        .filter(recommendation_log::Column::WasClicked.eq(true))
        .all(storage.get_db())
        .await
        .unwrap();
    assert!(clicked.is_empty());
}

#[tokio::test]
async fn test_click_without_impression_still_records() {
    let (storage, _dir) = create_temp_storage().await;
    seed_reader(&storage, "reader-1").await;
    seed_article(&storage, "article-1", Some("tech"), base_time()).await;

    let engine = EngagementEngine::new(storage, &get_config());
    let outcome = engine
        .track(
            "reader-1",
            "article-1",
            ActivityKind::Click,
            &EngagementSignals::default().from_recommendation("hybrid"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.record.source_channel, "recommendation");
}

#[tokio::test]
async fn test_engine_recommends_from_tracked_history() {
    let (storage, _dir) = create_temp_storage().await;
    seed_reader(&storage, "reader-1").await;
    seed_article(&storage, "seen", Some("tech"), base_time()).await;
    seed_article(&storage, "unseen", Some("tech"), base_time()).await;
    seed_article(&storage, "other", Some("sport"), base_time()).await;

    let engine = EngagementEngine::new(storage, &get_config());
    engine
        .track(
            "reader-1",
            "seen",
            ActivityKind::Read,
            &EngagementSignals::default().with_duration(90.0),
        )
        .await
        .unwrap();

    let recommended = engine.recommender().recommend("reader-1", 5).await.unwrap();
    let ids: Vec<&str> = recommended.iter().map(|r| r.article_id.as_str()).collect();
    assert_eq!(ids, vec!["unseen"]);

    let top = engine.stats().top_categories("reader-1", 3).await.unwrap();
    assert_eq!(top[0].category, "tech");
    assert_eq!(top[0].total_duration_seconds, 90);
}
