use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{TickerError, TickerResult};

pub const MAX_TITLE_LEN: usize = 150;
pub const MAX_MESSAGE_LEN: usize = 300;
pub const MAX_ACTION_LABEL_LEN: usize = 30;
pub const MAX_PRIORITY: i32 = 5;

/// Presentation hint. Has no effect on selection or ordering.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TickerVariant {
    #[default]
    Info,
    Success,
    Warning,
    /// Older records and clients send "urgent".
    #[serde(alias = "urgent")]
    Error,
}

impl std::fmt::Display for TickerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TickerVariant::Info => "info",
            TickerVariant::Success => "success",
            TickerVariant::Warning => "warning",
            TickerVariant::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TickerVariant {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(TickerVariant::Info),
            "success" => Ok(TickerVariant::Success),
            "warning" => Ok(TickerVariant::Warning),
            "error" | "urgent" => Ok(TickerVariant::Error),
            _ => Err(TickerError::invalid(format!("unknown variant: {s}"))),
        }
    }
}

/// Where a ticker entry comes from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TickerSource {
    #[default]
    Manual,
    AutoEvent,
    AutoOpportunity,
}

impl std::fmt::Display for TickerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TickerSource::Manual => "manual",
            TickerSource::AutoEvent => "auto-event",
            TickerSource::AutoOpportunity => "auto-opportunity",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TickerSource {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(TickerSource::Manual),
            "auto-event" => Ok(TickerSource::AutoEvent),
            "auto-opportunity" => Ok(TickerSource::AutoOpportunity),
            _ => Err(TickerError::invalid(format!("unknown source: {s}"))),
        }
    }
}

/// A validated ticker record. Only produced through [`TickerRow`] conversion
/// or by the store after an insert, so required fields are always present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TickerItem {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: TickerSource,
    pub variant: TickerVariant,
    pub priority: i32,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TickerItem {
    /// Active flag set and `now` inside the inclusive `[start_date, end_date]` window.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && self.end_date.map_or(true, |end| end >= now)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_some_and(|end| end < now)
    }
}

/// Raw `ticker_items` row. Legacy rows were written without a schema, so the
/// required fields are nullable here and checked on conversion.
#[derive(Debug, Clone, FromRow)]
pub struct TickerRow {
    pub id: Uuid,
    pub title: Option<String>,
    pub message: Option<String>,
    pub kind: Option<String>,
    pub source: String,
    pub variant: String,
    pub priority: i32,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn missing(id: Uuid, field: &str) -> TickerError {
    TickerError::InvalidRecord(format!("ticker item {id} is missing required field `{field}`"))
}

impl TryFrom<TickerRow> for TickerItem {
    type Error = TickerError;

    fn try_from(row: TickerRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let title = row
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| missing(id, "title"))?;
        let message = row.message.ok_or_else(|| missing(id, "message"))?;
        let kind = row
            .kind
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| missing(id, "type"))?;
        let is_active = row.is_active.ok_or_else(|| missing(id, "isActive"))?;
        let start_date = row.start_date.ok_or_else(|| missing(id, "startDate"))?;

        let source: TickerSource = row.source.parse().map_err(|_| {
            TickerError::InvalidRecord(format!("ticker item {id} has unknown source `{}`", row.source))
        })?;
        // Variant is cosmetic: an unknown value falls back to info.
        let variant: TickerVariant = row.variant.parse().unwrap_or_default();

        Ok(TickerItem {
            id,
            title,
            message,
            kind,
            source,
            variant,
            priority: row.priority,
            action_url: row.action_url,
            action_label: row.action_label,
            icon: row.icon,
            is_active,
            start_date,
            end_date: row.end_date,
            view_count: row.view_count,
            click_count: row.click_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a batch of rows. In strict mode the first invalid row fails the
/// whole batch; otherwise invalid rows are dropped with a warning.
pub fn validate_rows(rows: Vec<TickerRow>, strict: bool) -> TickerResult<Vec<TickerItem>> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        match TickerItem::try_from(row) {
            Ok(item) => items.push(item),
            Err(e) if !strict => tracing::warn!("skipping invalid ticker row: {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(items)
}

/// The two columns admin delete/toggle need. Read without full row
/// validation so a broken legacy row can still be removed or switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemState {
    pub source: TickerSource,
    /// A NULL flag reads as inactive.
    pub is_active: bool,
}

/// A validated item ready to be inserted. Counters and timestamps are set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTickerItem {
    pub title: String,
    pub message: String,
    pub kind: String,
    pub source: TickerSource,
    pub variant: TickerVariant,
    pub priority: i32,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Body for POST /ticker.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTickerRequest {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub variant: TickerVariant,
    #[serde(default)]
    pub priority: i32,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Defaults to the creation instant.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl CreateTickerRequest {
    /// Trim, validate and stamp the request as a manual item.
    pub fn into_new_item(self, now: DateTime<Utc>) -> TickerResult<NewTickerItem> {
        let item = NewTickerItem {
            title: self.title.trim().to_string(),
            message: self.message.trim().to_string(),
            kind: self.kind.trim().to_string(),
            source: TickerSource::Manual,
            variant: self.variant,
            priority: self.priority,
            action_url: clean(self.action_url),
            action_label: clean(self.action_label),
            icon: clean(self.icon),
            is_active: self.is_active,
            start_date: self.start_date.unwrap_or(now),
            end_date: self.end_date,
        };
        validate_content(&Content {
            title: &item.title,
            message: &item.message,
            kind: &item.kind,
            priority: item.priority,
            action_label: item.action_label.as_deref(),
            start_date: item.start_date,
            end_date: item.end_date,
        })?;
        Ok(item)
    }
}

/// Distinguishes an absent field from an explicit `null` in a JSON patch.
fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Body for PUT /ticker/{id}. Absent fields are left unchanged; `null` clears
/// an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTickerRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub variant: Option<TickerVariant>,
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub action_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub action_label: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub icon: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateTickerRequest {
    /// Apply the patch to `item` and re-validate the result. `item` is left
    /// untouched when validation fails.
    pub fn apply_to(self, item: &TickerItem) -> TickerResult<TickerItem> {
        let mut next = item.clone();
        if let Some(title) = self.title {
            next.title = title.trim().to_string();
        }
        if let Some(message) = self.message {
            next.message = message.trim().to_string();
        }
        if let Some(kind) = self.kind {
            next.kind = kind.trim().to_string();
        }
        if let Some(variant) = self.variant {
            next.variant = variant;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(url) = self.action_url {
            next.action_url = clean(url);
        }
        if let Some(label) = self.action_label {
            next.action_label = clean(label);
        }
        if let Some(icon) = self.icon {
            next.icon = clean(icon);
        }
        if let Some(active) = self.is_active {
            next.is_active = active;
        }
        if let Some(start) = self.start_date {
            next.start_date = start;
        }
        if let Some(end) = self.end_date {
            next.end_date = end;
        }

        validate_content(&Content {
            title: &next.title,
            message: &next.message,
            kind: &next.kind,
            priority: next.priority,
            action_label: next.action_label.as_deref(),
            start_date: next.start_date,
            end_date: next.end_date,
        })?;
        Ok(next)
    }
}

/// Query params for GET /ticker/admin/all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub is_active: Option<bool>,
}

impl AdminListQuery {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    /// Resolved `(page, limit, offset)`; page is 1-based.
    pub fn paging(&self) -> TickerResult<(i64, i64, i64)> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(Self::DEFAULT_LIMIT);
        if page < 1 {
            return Err(TickerError::invalid(format!("page must be >= 1, got {page}")));
        }
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(TickerError::invalid(format!(
                "limit must be between 1 and {}, got {limit}",
                Self::MAX_LIMIT
            )));
        }
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| TickerError::invalid(format!("page {page} is out of range")))?;
        Ok((page, limit, offset))
    }
}

/// One page of the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPage {
    pub items: Vec<TickerItem>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

/// Which engagement counter to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Clicks,
}

impl Counter {
    pub fn label(self) -> &'static str {
        match self {
            Counter::Views => "view",
            Counter::Clicks => "click",
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

struct Content<'a> {
    title: &'a str,
    message: &'a str,
    kind: &'a str,
    priority: i32,
    action_label: Option<&'a str>,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
}

fn validate_content(c: &Content<'_>) -> TickerResult<()> {
    if c.title.is_empty() {
        return Err(TickerError::invalid("title is required"));
    }
    if c.title.chars().count() > MAX_TITLE_LEN {
        return Err(TickerError::invalid(format!(
            "title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    if c.message.is_empty() {
        return Err(TickerError::invalid("message is required"));
    }
    if c.message.chars().count() > MAX_MESSAGE_LEN {
        return Err(TickerError::invalid(format!(
            "message cannot exceed {MAX_MESSAGE_LEN} characters"
        )));
    }
    if c.kind.is_empty() {
        return Err(TickerError::invalid("type is required"));
    }
    if !(0..=MAX_PRIORITY).contains(&c.priority) {
        return Err(TickerError::invalid(format!(
            "priority must be between 0 and {MAX_PRIORITY}, got {}",
            c.priority
        )));
    }
    if c
        .action_label
        .is_some_and(|l| l.chars().count() > MAX_ACTION_LABEL_LEN)
    {
        return Err(TickerError::invalid(format!(
            "action label cannot exceed {MAX_ACTION_LABEL_LEN} characters"
        )));
    }
    if let Some(end) = c.end_date {
        if end <= c.start_date {
            return Err(TickerError::invalid("end date must be after start date"));
        }
    }
    Ok(())
}
