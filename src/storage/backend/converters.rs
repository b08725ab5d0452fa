use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::{EngagementError, Result};
use crate::storage::models::{
    ActivityKind, Article, EngagementDraft, EngagementRecord, LegacyInteraction,
};
use migration::entities::{article, engagement_record, user_interaction};

/// 解析 extra 文本列；内容损坏时按空对象处理
pub fn decode_extra(raw: Option<&str>) -> Map<String, Value> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(
                "Engagement extra is not a JSON object ({}), using empty baseline",
                type_name(&other)
            );
            Map::new()
        }
        Err(e) => {
            warn!("Corrupted engagement extra, using empty baseline: {}", e);
            Map::new()
        }
    }
}

pub(crate) fn encode_extra(extra: &Map<String, Value>) -> Result<Option<String>> {
    if extra.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(extra)?))
}

/// 浅合并：新值覆盖同名 key
pub(crate) fn merge_extra(
    mut stored: Map<String, Value>,
    incoming: &Map<String, Value>,
) -> Map<String, Value> {
    for (key, value) in incoming {
        stored.insert(key.clone(), value.clone());
    }
    stored
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 将 Sea-ORM Model 转换为 EngagementRecord
pub fn record_from_model(model: engagement_record::Model) -> Result<EngagementRecord> {
    let kind = ActivityKind::from_str(&model.kind).map_err(|_| {
        EngagementError::serialization(format!(
            "Unknown activity kind '{}' on engagement record {}",
            model.kind, model.id
        ))
    })?;

    Ok(EngagementRecord {
        id: model.id,
        extra: decode_extra(model.extra.as_deref()),
        reader_id: model.reader_id,
        article_id: model.article_id,
        kind,
        duration_seconds: model.duration_seconds.max(0),
        scroll_percent: model.scroll_percent,
        source_channel: model.source_channel,
        recommendation_kind: model.recommendation_kind,
        created_at: model.created_at,
        last_merged_at: model.last_merged_at,
    })
}

/// 新建记录的 ActiveModel
pub fn draft_to_active_model(
    draft: &EngagementDraft,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<engagement_record::ActiveModel> {
    use sea_orm::ActiveValue::*;

    Ok(engagement_record::ActiveModel {
        id: NotSet,
        reader_id: Set(draft.reader_id.clone()),
        article_id: Set(draft.article_id.clone()),
        kind: Set(draft.kind.to_string()),
        duration_seconds: Set(draft.duration_seconds.max(0)),
        scroll_percent: Set(draft.scroll_percent),
        source_channel: Set(draft.source_channel.clone()),
        recommendation_kind: Set(draft.recommendation_kind.clone()),
        extra: Set(encode_extra(&draft.extra)?),
        created_at: Set(now),
        last_merged_at: Set(now),
    })
}

pub fn article_from_model(model: article::Model) -> Article {
    Article {
        id: model.id,
        title: model.title,
        summary: model.summary,
        url: model.original_url,
        image_url: model.image_url,
        category: model.category,
        place: model.place,
        published_at: model.published_at,
    }
}

pub fn interaction_from_model(model: user_interaction::Model) -> LegacyInteraction {
    LegacyInteraction {
        id: model.id,
        profile_id: model.profile_id,
        article_id: model.article_id,
        time_spent_seconds: model.time_spent_seconds,
        visits: model.visits,
        category: model.category,
        note: model.note,
        interaction_at: model.interaction_at,
    }
}
