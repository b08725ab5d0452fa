//! Reading statistics tests
//!
//! Aggregation over real engagement rows, window filtering and the
//! export / recent-activity helpers.

mod common;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use readpulse::services::{ActivityRecorder, ReadingStatsAggregator, UNKNOWN_CATEGORY};
use readpulse::storage::{ActivityKind, EngagementSignals, EngagementStore, SeaOrmStorage};

use common::{base_time, create_temp_storage, seed_article, seed_reader};

struct Fixture {
    storage: Arc<SeaOrmStorage>,
    recorder: ActivityRecorder,
    stats: ReadingStatsAggregator,
    _dir: tempfile::TempDir,
}

async fn fixture() -> Fixture {
    let (storage, dir) = create_temp_storage().await;
    seed_reader(&storage, "reader-1").await;
    seed_reader(&storage, "reader-2").await;

    let published = base_time() - Duration::days(1);
    seed_article(&storage, "tech-1", Some("tech"), published).await;
    seed_article(&storage, "tech-2", Some("tech"), published).await;
    seed_article(&storage, "sport-1", Some("sport"), published).await;
    seed_article(&storage, "misc-1", None, published).await;

    Fixture {
        recorder: ActivityRecorder::new(
            storage.clone(),
            storage.clone(),
            storage.clone(),
            Duration::minutes(5),
        ),
        stats: ReadingStatsAggregator::new(storage.clone(), 30),
        storage,
        _dir: dir,
    }
}

async fn read(
    fx: &Fixture,
    reader: &str,
    article: &str,
    kind: ActivityKind,
    seconds: f64,
    at: DateTime<Utc>,
) {
    fx.recorder
        .record_at(
            reader,
            article,
            kind,
            &EngagementSignals::default().with_duration(seconds),
            at,
        )
        .await
        .unwrap();
}

// =============================================================================
// compute
// =============================================================================

#[tokio::test]
async fn test_stats_group_by_category() {
    let fx = fixture().await;
    let t0 = base_time();

    read(&fx, "reader-1", "tech-1", ActivityKind::Read, 100.0, t0).await;
    read(&fx, "reader-1", "tech-2", ActivityKind::Read, 50.0, t0 + Duration::minutes(10)).await;
    // 同一篇文章不同行为类型，文章只计一次
    read(&fx, "reader-1", "tech-1", ActivityKind::Like, 10.0, t0 + Duration::minutes(20)).await;
    read(&fx, "reader-1", "sport-1", ActivityKind::View, 300.0, t0 + Duration::minutes(30)).await;

    let snapshot = fx
        .stats
        .compute_at("reader-1", 7, t0 + Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(snapshot.window_days, 7);
    assert_eq!(snapshot.total_distinct_articles, 3);
    assert_eq!(snapshot.total_duration_seconds, 460);
    assert!((snapshot.average_duration_per_article - 460.0 / 3.0).abs() < 1e-9);

    assert_eq!(snapshot.per_category.len(), 2);
    let sport = &snapshot.per_category[0];
    assert_eq!(sport.category, "sport");
    assert_eq!(sport.article_count, 1);
    assert_eq!(sport.total_duration_seconds, 300);

    let tech = &snapshot.per_category[1];
    assert_eq!(tech.category, "tech");
    assert_eq!(tech.article_count, 2);
    assert_eq!(tech.total_duration_seconds, 160);
    assert_eq!(tech.average_duration_seconds, 80.0);
}

#[tokio::test]
async fn test_stats_missing_category_goes_to_unknown() {
    let fx = fixture().await;
    let t0 = base_time();

    read(&fx, "reader-1", "misc-1", ActivityKind::Read, 42.0, t0).await;

    let snapshot = fx
        .stats
        .compute_at("reader-1", 30, t0 + Duration::minutes(1))
        .await
        .unwrap();

    assert_eq!(snapshot.per_category.len(), 1);
    assert_eq!(snapshot.per_category[0].category, UNKNOWN_CATEGORY);
    assert_eq!(snapshot.per_category[0].total_duration_seconds, 42);
}

#[tokio::test]
async fn test_stats_exclude_records_outside_window() {
    let fx = fixture().await;
    let now = base_time();

    read(&fx, "reader-1", "tech-1", ActivityKind::Read, 60.0, now - Duration::days(10)).await;
    read(&fx, "reader-1", "sport-1", ActivityKind::Read, 20.0, now - Duration::days(2)).await;

    let snapshot = fx.stats.compute_at("reader-1", 7, now).await.unwrap();
    assert_eq!(snapshot.total_distinct_articles, 1);
    assert_eq!(snapshot.total_duration_seconds, 20);
    assert_eq!(snapshot.per_category[0].category, "sport");

    let wide = fx.stats.compute_at("reader-1", 30, now).await.unwrap();
    assert_eq!(wide.total_distinct_articles, 2);
    assert_eq!(wide.per_category[0].category, "tech");
}

#[tokio::test]
async fn test_stats_zero_window_is_empty() {
    let fx = fixture().await;
    let t0 = base_time();

    read(&fx, "reader-1", "tech-1", ActivityKind::Read, 60.0, t0).await;

    let snapshot = fx.stats.compute_at("reader-1", 0, t0).await.unwrap();
    assert_eq!(snapshot.total_distinct_articles, 0);
    assert_eq!(snapshot.total_duration_seconds, 0);
    assert_eq!(snapshot.average_duration_per_article, 0.0);
    assert!(snapshot.per_category.is_empty());
}

#[tokio::test]
async fn test_stats_for_reader_without_history() {
    let fx = fixture().await;

    let snapshot = fx.stats.compute("reader-2", 30).await.unwrap();
    assert_eq!(snapshot.reader_id, "reader-2");
    assert_eq!(snapshot.total_distinct_articles, 0);
    assert!(snapshot.per_category.is_empty());
}

#[tokio::test]
async fn test_stats_are_per_reader() {
    let fx = fixture().await;
    let t0 = base_time();

    read(&fx, "reader-1", "tech-1", ActivityKind::Read, 60.0, t0).await;
    read(&fx, "reader-2", "sport-1", ActivityKind::Read, 90.0, t0).await;

    let snapshot = fx
        .stats
        .compute_at("reader-1", 30, t0 + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(snapshot.total_duration_seconds, 60);
    assert_eq!(snapshot.per_category.len(), 1);
    assert_eq!(snapshot.per_category[0].category, "tech");
}

#[tokio::test]
async fn test_top_categories_respects_limit() {
    let fx = fixture().await;
    let t0 = base_time();

    read(&fx, "reader-1", "tech-1", ActivityKind::Read, 10.0, t0).await;
    read(&fx, "reader-1", "sport-1", ActivityKind::Read, 30.0, t0).await;
    read(&fx, "reader-1", "misc-1", ActivityKind::Read, 20.0, t0).await;

    let top = fx.stats.top_categories("reader-1", 2).await.unwrap();
    let names: Vec<&str> = top.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["sport", UNKNOWN_CATEGORY]);

    assert!(fx.stats.top_categories("reader-1", 0).await.unwrap().is_empty());
}

// =============================================================================
// export / recent
// =============================================================================

#[tokio::test]
async fn test_export_activities_newest_first_with_article_fields() {
    let fx = fixture().await;
    let t0 = base_time();

    read(&fx, "reader-1", "tech-1", ActivityKind::Read, 10.0, t0).await;
    read(&fx, "reader-1", "sport-1", ActivityKind::Like, 0.0, t0 + Duration::minutes(10)).await;
    read(&fx, "reader-2", "misc-1", ActivityKind::View, 5.0, t0 + Duration::minutes(20)).await;

    let all = fx.stats.export_activities(None, 100).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].article_id, "misc-1");
    assert_eq!(all[0].category, None);
    assert_eq!(all[2].article_id, "tech-1");
    assert_eq!(all[2].category.as_deref(), Some("tech"));
    assert_eq!(all[2].place.as_deref(), Some("Lisbon"));
    assert_eq!(all[2].scroll_percent, 0.0);

    let mine = fx.stats.export_activities(Some("reader-1"), 1).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].article_id, "sport-1");
    assert_eq!(mine[0].kind, ActivityKind::Like);
}

#[tokio::test]
async fn test_recent_article_ids_deduplicated_and_filtered_by_kind() {
    let fx = fixture().await;
    let t0 = base_time();

    read(&fx, "reader-1", "tech-1", ActivityKind::Read, 10.0, t0).await;
    read(&fx, "reader-1", "sport-1", ActivityKind::View, 10.0, t0 + Duration::minutes(10)).await;
    read(&fx, "reader-1", "tech-1", ActivityKind::Like, 0.0, t0 + Duration::minutes(20)).await;
    read(&fx, "reader-1", "misc-1", ActivityKind::Share, 0.0, t0 + Duration::minutes(30)).await;

    let recent = fx
        .storage
        .recent_article_ids("reader-1", &ActivityKind::RECENT_CONTEXT, 10)
        .await
        .unwrap();
    assert_eq!(recent, vec!["tech-1".to_string(), "sport-1".to_string()]);

    let limited = fx
        .storage
        .recent_article_ids("reader-1", &ActivityKind::RECENT_CONTEXT, 1)
        .await
        .unwrap();
    assert_eq!(limited, vec!["tech-1".to_string()]);
}
