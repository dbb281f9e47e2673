use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ticker::{TickerItem, TickerSource, TickerVariant};

/// Alumni event, read from `events` to derive "upcoming event" entries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    /// Free-form label such as "Workshop" or "Reunion".
    pub kind: Option<String>,
    pub date: DateTime<Utc>,
    /// Display text, e.g. "18:30".
    pub start_time: Option<String>,
    pub venue: Option<String>,
    pub status: String,
    pub visibility: String,
}

/// Job or internship posting, read from `opportunities`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Opportunity {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub category: Option<String>,
    pub job_type: Option<String>,
    pub is_featured: bool,
    pub status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
}

/// One entry of the public ticker feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    /// `<uuid>` for manual items, `event-<uuid>` / `job-<uuid>` for derived ones.
    pub id: String,
    pub original_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: TickerSource,
    pub variant: TickerVariant,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub priority: i32,
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub view_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub click_count: Option<i64>,
}

impl From<&TickerItem> for FeedEntry {
    fn from(item: &TickerItem) -> Self {
        FeedEntry {
            id: item.id.to_string(),
            original_id: item.id,
            title: item.title.clone(),
            message: item.message.clone(),
            kind: item.kind.clone(),
            source: item.source,
            variant: item.variant,
            action_url: item.action_url.clone(),
            action_label: item.action_label.clone(),
            priority: item.priority,
            icon: item.icon.clone(),
            view_count: Some(item.view_count),
            click_count: Some(item.click_count),
        }
    }
}

/// Result of a feed lookup; `cached` is true when served from Redis.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub cached: bool,
}
