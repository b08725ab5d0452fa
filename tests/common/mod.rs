//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{DateTime, Duration, DurationRound, Utc};
use readpulse::config::init_config;
use readpulse::storage::SeaOrmStorage;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use tempfile::TempDir;

use migration::entities::{article, profile};

// 确保 config 只初始化一次
static INIT: Once = Once::new();

pub fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

/// 创建临时 SQLite 数据库的存储实例
pub async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_test_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");

    (Arc::new(storage), temp_dir)
}

/// 测试基准时间：两小时前，截断到秒
pub fn base_time() -> DateTime<Utc> {
    (Utc::now() - Duration::hours(2))
        .duration_trunc(Duration::seconds(1))
        .expect("truncate base time")
}

pub async fn seed_reader(storage: &SeaOrmStorage, reader_id: &str) {
    profile::ActiveModel {
        id: Set(reader_id.to_string()),
        username: Set(Some(reader_id.to_string())),
        full_name: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(storage.get_db())
    .await
    .expect("Failed to seed reader");
}

pub async fn seed_article(
    storage: &SeaOrmStorage,
    article_id: &str,
    category: Option<&str>,
    published_at: DateTime<Utc>,
) {
    article::ActiveModel {
        id: Set(article_id.to_string()),
        title: Set(format!("Title of {}", article_id)),
        summary: Set(Some(format!("Summary of {}", article_id))),
        original_url: Set(format!("https://news.example.com/{}", article_id)),
        image_url: Set(None),
        category: Set(category.map(str::to_string)),
        place: Set(Some("Lisbon".to_string())),
        published_at: Set(published_at),
        created_at: Set(Utc::now()),
    }
    .insert(storage.get_db())
    .await
    .expect("Failed to seed article");
}
