pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::TickerResult;
use crate::models::{
    feed::{Event, Opportunity},
    ticker::{Counter, ItemState, NewTickerItem, TickerItem},
};

pub use postgres::PgTickerStore;

/// Persistent home of the ticker catalog and of the event/job sources the
/// feed is derived from. Opened once at startup and shared as `Arc<dyn TickerStore>`.
#[async_trait]
pub trait TickerStore: Send + Sync + 'static {
    async fn ping(&self) -> TickerResult<()>;

    /// Every ticker item, unordered. The selector filters this snapshot.
    async fn catalog(&self) -> TickerResult<Vec<TickerItem>>;

    /// Newest first, optionally filtered on the active flag. Returns the page and
    /// the total count. Rows that fail validation are skipped, never fatal.
    async fn list_items(
        &self,
        is_active: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> TickerResult<(Vec<TickerItem>, i64)>;

    async fn get_item(&self, id: Uuid) -> TickerResult<Option<TickerItem>>;

    /// Source and active flag of a row, whether or not the rest of it is valid.
    async fn item_state(&self, id: Uuid) -> TickerResult<Option<ItemState>>;

    async fn insert_item(&self, item: NewTickerItem) -> TickerResult<TickerItem>;

    /// Overwrite the editable fields of an existing item. `None` if it no longer exists.
    async fn replace_item(&self, item: &TickerItem) -> TickerResult<Option<TickerItem>>;

    async fn delete_item(&self, id: Uuid) -> TickerResult<bool>;

    async fn delete_all(&self) -> TickerResult<u64>;

    async fn set_active(&self, id: Uuid, active: bool) -> TickerResult<bool>;

    async fn increment(&self, id: Uuid, counter: Counter) -> TickerResult<bool>;

    /// Clear the active flag of every item whose end date is before `now`.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> TickerResult<u64>;

    /// Public upcoming events dated within `[from, until]`, soonest first.
    async fn upcoming_events(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: i64,
    ) -> TickerResult<Vec<Event>>;

    /// Active openings created since `since` whose deadline is not past `now`.
    /// Featured first, then newest.
    async fn recent_opportunities(
        &self,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TickerResult<Vec<Opportunity>>;
}
