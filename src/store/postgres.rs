use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::TickerStore;
use crate::error::{TickerError, TickerResult};
use crate::models::{
    feed::{Event, Opportunity},
    ticker::{
        validate_rows, Counter, ItemState, NewTickerItem, TickerItem, TickerRow, TickerSource,
    },
};

const TICKER_COLUMNS: &str = "id, title, message, kind, source, variant, priority, \
     action_url, action_label, icon, is_active, start_date, end_date, \
     view_count, click_count, created_at, updated_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgTickerStore {
    pool: PgPool,
    strict_records: bool,
}

impl PgTickerStore {
    /// `strict_records` decides whether an invalid row fails a catalog read or is skipped.
    pub fn new(pool: PgPool, strict_records: bool) -> Self {
        Self {
            pool,
            strict_records,
        }
    }
}

#[async_trait]
impl TickerStore for PgTickerStore {
    async fn ping(&self) -> TickerResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn catalog(&self) -> TickerResult<Vec<TickerItem>> {
        let rows = sqlx::query_as::<_, TickerRow>(&format!(
            "SELECT {TICKER_COLUMNS} FROM ticker_items"
        ))
        .fetch_all(&self.pool)
        .await?;
        validate_rows(rows, self.strict_records)
    }

    async fn list_items(
        &self,
        is_active: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> TickerResult<(Vec<TickerItem>, i64)> {
        let rows = sqlx::query_as::<_, TickerRow>(&format!(
            "SELECT {TICKER_COLUMNS} FROM ticker_items
             WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(is_active)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM ticker_items
             WHERE ($1::BOOLEAN IS NULL OR is_active = $1)",
        )
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok((validate_rows(rows, false)?, total))
    }

    async fn get_item(&self, id: Uuid) -> TickerResult<Option<TickerItem>> {
        let row = sqlx::query_as::<_, TickerRow>(&format!(
            "SELECT {TICKER_COLUMNS} FROM ticker_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TickerItem::try_from).transpose()
    }

    async fn item_state(&self, id: Uuid) -> TickerResult<Option<ItemState>> {
        let row: Option<(String, Option<bool>)> =
            sqlx::query_as("SELECT source, is_active FROM ticker_items WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(source, is_active)| -> TickerResult<ItemState> {
            let source: TickerSource = source.parse().map_err(|_| {
                TickerError::InvalidRecord(format!("ticker item {id} has unknown source `{source}`"))
            })?;
            Ok(ItemState {
                source,
                is_active: is_active.unwrap_or(false),
            })
        })
        .transpose()
    }

    async fn insert_item(&self, item: NewTickerItem) -> TickerResult<TickerItem> {
        let row = sqlx::query_as::<_, TickerRow>(&format!(
            "INSERT INTO ticker_items
                (title, message, kind, source, variant, priority,
                 action_url, action_label, icon, is_active, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {TICKER_COLUMNS}"
        ))
        .bind(&item.title)
        .bind(&item.message)
        .bind(&item.kind)
        .bind(item.source.to_string())
        .bind(item.variant.to_string())
        .bind(item.priority)
        .bind(&item.action_url)
        .bind(&item.action_label)
        .bind(&item.icon)
        .bind(item.is_active)
        .bind(item.start_date)
        .bind(item.end_date)
        .fetch_one(&self.pool)
        .await?;
        TickerItem::try_from(row)
    }

    async fn replace_item(&self, item: &TickerItem) -> TickerResult<Option<TickerItem>> {
        let row = sqlx::query_as::<_, TickerRow>(&format!(
            "UPDATE ticker_items SET
                title = $2, message = $3, kind = $4, variant = $5, priority = $6,
                action_url = $7, action_label = $8, icon = $9, is_active = $10,
                start_date = $11, end_date = $12, updated_at = NOW()
             WHERE id = $1
             RETURNING {TICKER_COLUMNS}"
        ))
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.message)
        .bind(&item.kind)
        .bind(item.variant.to_string())
        .bind(item.priority)
        .bind(&item.action_url)
        .bind(&item.action_label)
        .bind(&item.icon)
        .bind(item.is_active)
        .bind(item.start_date)
        .bind(item.end_date)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TickerItem::try_from).transpose()
    }

    async fn delete_item(&self, id: Uuid) -> TickerResult<bool> {
        let res = sqlx::query("DELETE FROM ticker_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_all(&self) -> TickerResult<u64> {
        let res = sqlx::query("DELETE FROM ticker_items")
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> TickerResult<bool> {
        let res = sqlx::query(
            "UPDATE ticker_items SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn increment(&self, id: Uuid, counter: Counter) -> TickerResult<bool> {
        let sql = match counter {
            Counter::Views => "UPDATE ticker_items SET view_count = view_count + 1 WHERE id = $1",
            Counter::Clicks => {
                "UPDATE ticker_items SET click_count = click_count + 1 WHERE id = $1"
            }
        };
        let res = sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> TickerResult<u64> {
        let res = sqlx::query(
            "UPDATE ticker_items
             SET is_active = FALSE, updated_at = NOW()
             WHERE is_active = TRUE AND end_date IS NOT NULL AND end_date < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn upcoming_events(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: i64,
    ) -> TickerResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, title, kind, date, start_time, venue, status, visibility
             FROM events
             WHERE status = 'upcoming' AND visibility = 'public'
               AND date BETWEEN $1 AND $2
             ORDER BY date ASC
             LIMIT $3",
        )
        .bind(from)
        .bind(until)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn recent_opportunities(
        &self,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TickerResult<Vec<Opportunity>> {
        let jobs = sqlx::query_as::<_, Opportunity>(
            "SELECT id, title, company, location, category, job_type, is_featured,
                    status, is_active, created_at, deadline
             FROM opportunities
             WHERE status = 'active' AND is_active = TRUE
               AND created_at >= $1 AND deadline >= $2
             ORDER BY is_featured DESC, created_at DESC
             LIMIT $3",
        )
        .bind(since)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }
}
