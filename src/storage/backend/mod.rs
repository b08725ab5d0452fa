//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod articles;
mod connection;
mod converters;
mod engagement;
mod interactions;
mod recommendation_log;
pub mod retry;

use sea_orm::{DatabaseConnection, DbBackend};
use tracing::info;

use crate::errors::{EngagementError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{
    article_from_model, decode_extra, draft_to_active_model, interaction_from_model,
    record_from_model,
};
pub use retry::RetryPolicy;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(EngagementError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        "postgresql" => "postgres".to_string(),
        other => other.to_string(),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry: RetryPolicy,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(EngagementError::database_config("DATABASE_URL is not set"));
        }

        let config = crate::config::get_config();
        let retry = RetryPolicy::from_config(&config.database);
        let backend_name = normalize_backend_name(backend_name);

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            retry,
        };

        run_migrations(&storage.db).await?;

        info!(
            "{} engagement storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 获取数据库连接（测试数据准备、CLI 等需要直接访问数据库的场景）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn get_backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn db_backend(&self) -> DbBackend {
        match self.backend_name.as_str() {
            "sqlite" => DbBackend::Sqlite,
            "mysql" => DbBackend::MySql,
            _ => DbBackend::Postgres,
        }
    }

    /// SQLite 没有行锁，写事务本身是串行的
    fn supports_row_locks(&self) -> bool {
        self.db_backend() != DbBackend::Sqlite
    }
}
