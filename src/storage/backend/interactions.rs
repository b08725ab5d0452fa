//! InteractionStore implementation for SeaOrmStorage (legacy interaction table)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};

use super::SeaOrmStorage;
use super::converters::interaction_from_model;
use crate::errors::{EngagementError, Result};
use crate::storage::models::{InteractionTotals, LegacyInteraction};
use crate::storage::traits::InteractionStore;

use migration::entities::user_interaction;

#[async_trait]
impl InteractionStore for SeaOrmStorage {
    async fn find_interaction(
        &self,
        profile_id: &str,
        article_id: &str,
    ) -> Result<Option<LegacyInteraction>> {
        let model = user_interaction::Entity::find()
            .filter(user_interaction::Column::ProfileId.eq(profile_id))
            .filter(user_interaction::Column::ArticleId.eq(article_id))
            .one(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("查询交互记录失败: {}", e)))?;
        Ok(model.map(interaction_from_model))
    }

    async fn insert_interaction(
        &self,
        profile_id: &str,
        article_id: &str,
        totals: &InteractionTotals,
        now: DateTime<Utc>,
    ) -> Result<LegacyInteraction> {
        let active = user_interaction::ActiveModel {
            profile_id: Set(profile_id.to_string()),
            article_id: Set(article_id.to_string()),
            time_spent_seconds: Set(Some(totals.time_spent_seconds)),
            visits: Set(Some(totals.visits)),
            category: Set(totals.category.clone()),
            note: Set(None),
            interaction_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("写入交互记录失败: {}", e)))?;
        Ok(interaction_from_model(model))
    }

    async fn save_interaction_totals(
        &self,
        interaction_id: i64,
        totals: &InteractionTotals,
        now: DateTime<Utc>,
    ) -> Result<LegacyInteraction> {
        let active = user_interaction::ActiveModel {
            id: Set(interaction_id),
            time_spent_seconds: Set(Some(totals.time_spent_seconds)),
            visits: Set(Some(totals.visits)),
            category: Set(totals.category.clone()),
            note: Set(None),
            interaction_at: Set(now),
            ..Default::default()
        };

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("更新交互记录失败: {}", e)))?;
        Ok(interaction_from_model(model))
    }

    async fn interactions_for_profile(&self, profile_id: &str) -> Result<Vec<LegacyInteraction>> {
        let models = user_interaction::Entity::find()
            .filter(user_interaction::Column::ProfileId.eq(profile_id))
            .order_by_asc(user_interaction::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EngagementError::storage(format!("查询交互记录失败: {}", e)))?;
        Ok(models.into_iter().map(interaction_from_model).collect())
    }
}
