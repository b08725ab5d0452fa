//! Reader and article lookups for SeaOrmStorage

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use super::SeaOrmStorage;
use super::converters::article_from_model;
use crate::errors::{EngagementError, Result};
use crate::storage::models::Article;
use crate::storage::traits::{ArticleLookup, ReaderDirectory};

use migration::entities::{article, profile};

#[async_trait]
impl ReaderDirectory for SeaOrmStorage {
    async fn reader_exists(&self, reader_id: &str) -> Result<bool> {
        let found = profile::Entity::find_by_id(reader_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("查询读者失败: {}", e)))?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl ArticleLookup for SeaOrmStorage {
    async fn find_article(&self, article_id: &str) -> Result<Option<Article>> {
        let model = article::Entity::find_by_id(article_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("查询文章失败: {}", e)))?;
        Ok(model.map(article_from_model))
    }

    async fn find_articles_by_categories(
        &self,
        categories: &[String],
        limit: u64,
    ) -> Result<Vec<Article>> {
        if categories.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let models = article::Entity::find()
            .filter(article::Column::Category.is_in(categories.iter().cloned()))
            .order_by_desc(article::Column::PublishedAt)
            .order_by_asc(article::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("按分类查询文章失败: {}", e)))?;

        Ok(models.into_iter().map(article_from_model).collect())
    }
}
