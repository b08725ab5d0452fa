//! Legacy interaction tracker tests

mod common;

use std::sync::Arc;

use readpulse::errors::EngagementError;
use readpulse::services::LegacyInteractionTracker;
use readpulse::storage::SeaOrmStorage;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};

use common::{base_time, create_temp_storage, seed_article, seed_reader};
use migration::entities::user_interaction;

async fn setup() -> (Arc<SeaOrmStorage>, tempfile::TempDir, LegacyInteractionTracker) {
    let (storage, dir) = create_temp_storage().await;
    seed_reader(&storage, "profile-1").await;
    seed_article(&storage, "article-1", Some("tech"), base_time()).await;
    seed_article(&storage, "article-2", Some("sport"), base_time()).await;
    seed_article(&storage, "article-3", None, base_time()).await;

    let tracker = LegacyInteractionTracker::new(storage.clone(), storage.clone(), storage.clone());
    (storage, dir, tracker)
}

/// 直接插入一条只有 note 的旧数据
async fn seed_legacy_row(storage: &SeaOrmStorage, article_id: &str, note: &str) -> i64 {
    user_interaction::ActiveModel {
        profile_id: Set("profile-1".to_string()),
        article_id: Set(article_id.to_string()),
        time_spent_seconds: Set(None),
        visits: Set(None),
        category: Set(None),
        note: Set(Some(note.to_string())),
        interaction_at: Set(base_time()),
        ..Default::default()
    }
    .insert(storage.get_db())
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_first_track_creates_row() {
    let (_storage, _dir, tracker) = setup().await;

    let row = tracker
        .track_at("profile-1", "article-1", 12.6, None, base_time())
        .await
        .unwrap();

    assert_eq!(row.time_spent_seconds, Some(13));
    assert_eq!(row.visits, Some(1));
    assert_eq!(row.category.as_deref(), Some("tech"));
    assert!(row.note.is_none());
}

#[tokio::test]
async fn test_repeat_track_accumulates() {
    let (_storage, _dir, tracker) = setup().await;
    let t0 = base_time();

    let first = tracker
        .track_at("profile-1", "article-1", 30.0, Some("science"), t0)
        .await
        .unwrap();
    let second = tracker
        .track_at("profile-1", "article-1", 15.0, None, t0)
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.time_spent_seconds, Some(45));
    assert_eq!(second.visits, Some(2));
    // 显式分类优先于文章分类
    assert_eq!(second.category.as_deref(), Some("science"));
}

#[tokio::test]
async fn test_decoded_note_is_used_as_baseline() {
    let (storage, _dir, tracker) = setup().await;
    let id = seed_legacy_row(
        &storage,
        "article-2",
        r#"{"time_spent_seconds": 100, "visits": 3}"#,
    )
    .await;

    let row = tracker
        .track_at("profile-1", "article-2", 20.0, None, base_time())
        .await
        .unwrap();

    assert_eq!(row.id, id);
    assert_eq!(row.time_spent_seconds, Some(120));
    assert_eq!(row.visits, Some(4));
    assert_eq!(row.category.as_deref(), Some("sport"));
    assert!(row.note.is_none());
}

#[tokio::test]
async fn test_corrupted_note_restarts_from_zero() {
    let (storage, _dir, tracker) = setup().await;
    let id = seed_legacy_row(&storage, "article-1", "{time_spent: oops").await;

    let row = tracker
        .track_at("profile-1", "article-1", 8.0, None, base_time())
        .await
        .unwrap();

    assert_eq!(row.id, id);
    assert_eq!(row.time_spent_seconds, Some(8));
    assert_eq!(row.visits, Some(1));

    let stored = user_interaction::Entity::find_by_id(id)
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.note.is_none());
    assert_eq!(stored.time_spent_seconds, Some(8));
}

#[tokio::test]
async fn test_track_unknown_profile_or_article() {
    let (_storage, _dir, tracker) = setup().await;

    let err = tracker
        .track("ghost", "article-1", 5.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngagementError::ReaderNotFound(_)));

    let err = tracker
        .track("profile-1", "missing", 5.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngagementError::ArticleNotFound(_)));
}

#[tokio::test]
async fn test_top_categories_skips_corrupted_and_uncategorized() {
    let (storage, _dir, tracker) = setup().await;
    let t0 = base_time();

    tracker
        .track_at("profile-1", "article-1", 50.0, None, t0)
        .await
        .unwrap();
    tracker
        .track_at("profile-1", "article-2", 80.0, None, t0)
        .await
        .unwrap();
    tracker
        .track_at("profile-1", "article-3", 500.0, None, t0)
        .await
        .unwrap();
    seed_legacy_row(&storage, "article-9", "not json at all").await;
    seed_legacy_row(
        &storage,
        "article-8",
        r#"{"time_spent_seconds": 40, "category": "tech"}"#,
    )
    .await;

    let top = tracker.top_categories("profile-1", 10).await.unwrap();
    let summary: Vec<(&str, i64)> = top
        .iter()
        .map(|c| (c.category.as_str(), c.time_spent_seconds))
        .collect();
    assert_eq!(summary, vec![("tech", 90), ("sport", 80)]);

    let limited = tracker.top_categories("profile-1", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].category, "tech");
}
