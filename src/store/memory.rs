use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::TickerStore;
use crate::error::{TickerError, TickerResult};
use crate::models::{
    feed::{Event, Opportunity},
    ticker::{Counter, ItemState, NewTickerItem, TickerItem},
};

/// In-process store used by unit and router tests. Reads follow the Postgres
/// store in strict mode.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<TickerItem>>,
    /// Ids that read back like legacy rows failing validation.
    invalid: Mutex<Vec<Uuid>>,
    events: Mutex<Vec<Event>>,
    jobs: Mutex<Vec<Opportunity>>,
}

impl MemoryStore {
    pub fn with_items(items: Vec<TickerItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    pub fn push_event(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn push_job(&self, job: Opportunity) {
        self.jobs.lock().unwrap().push(job);
    }

    pub fn snapshot(&self) -> Vec<TickerItem> {
        self.items.lock().unwrap().clone()
    }

    /// Make `id` behave like a stored row with a missing required field.
    pub fn mark_invalid(&self, id: Uuid) {
        self.invalid.lock().unwrap().push(id);
    }

    fn is_invalid(&self, id: Uuid) -> bool {
        self.invalid.lock().unwrap().contains(&id)
    }

    fn invalid_record(id: Uuid) -> TickerError {
        TickerError::InvalidRecord(format!("ticker item {id} is missing required field `title`"))
    }
}

#[async_trait]
impl TickerStore for MemoryStore {
    async fn ping(&self) -> TickerResult<()> {
        Ok(())
    }

    async fn catalog(&self) -> TickerResult<Vec<TickerItem>> {
        let items = self.snapshot();
        if let Some(bad) = items.iter().find(|i| self.is_invalid(i.id)) {
            return Err(Self::invalid_record(bad.id));
        }
        Ok(items)
    }

    async fn list_items(
        &self,
        is_active: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> TickerResult<(Vec<TickerItem>, i64)> {
        let mut matching: Vec<TickerItem> = self
            .snapshot()
            .into_iter()
            .filter(|i| is_active.map_or(true, |a| i.is_active == a))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .filter(|i| !self.is_invalid(i.id))
            .collect();
        Ok((page, total))
    }

    async fn get_item(&self, id: Uuid) -> TickerResult<Option<TickerItem>> {
        if self.is_invalid(id) {
            return Err(Self::invalid_record(id));
        }
        Ok(self.snapshot().into_iter().find(|i| i.id == id))
    }

    async fn item_state(&self, id: Uuid) -> TickerResult<Option<ItemState>> {
        Ok(self.snapshot().into_iter().find(|i| i.id == id).map(|i| ItemState {
            source: i.source,
            is_active: i.is_active,
        }))
    }

    async fn insert_item(&self, item: NewTickerItem) -> TickerResult<TickerItem> {
        let now = Utc::now();
        let stored = TickerItem {
            id: Uuid::new_v4(),
            title: item.title,
            message: item.message,
            kind: item.kind,
            source: item.source,
            variant: item.variant,
            priority: item.priority,
            action_url: item.action_url,
            action_label: item.action_label,
            icon: item.icon,
            is_active: item.is_active,
            start_date: item.start_date,
            end_date: item.end_date,
            view_count: 0,
            click_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.items.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn replace_item(&self, item: &TickerItem) -> TickerResult<Option<TickerItem>> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|i| i.id == item.id).map(|slot| {
            *slot = TickerItem {
                updated_at: Utc::now(),
                ..item.clone()
            };
            slot.clone()
        }))
    }

    async fn delete_item(&self, id: Uuid) -> TickerResult<bool> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() != before)
    }

    async fn delete_all(&self) -> TickerResult<u64> {
        let mut items = self.items.lock().unwrap();
        let n = items.len() as u64;
        items.clear();
        Ok(n)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> TickerResult<bool> {
        let mut items = self.items.lock().unwrap();
        Ok(items
            .iter_mut()
            .find(|i| i.id == id)
            .map(|i| i.is_active = active)
            .is_some())
    }

    async fn increment(&self, id: Uuid, counter: Counter) -> TickerResult<bool> {
        let mut items = self.items.lock().unwrap();
        Ok(items
            .iter_mut()
            .find(|i| i.id == id)
            .map(|i| match counter {
                Counter::Views => i.view_count += 1,
                Counter::Clicks => i.click_count += 1,
            })
            .is_some())
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> TickerResult<u64> {
        let mut items = self.items.lock().unwrap();
        let mut n = 0;
        for item in items.iter_mut().filter(|i| i.is_active && i.is_expired_at(now)) {
            item.is_active = false;
            n += 1;
        }
        Ok(n)
    }

    async fn upcoming_events(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: i64,
    ) -> TickerResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.status == "upcoming" && e.visibility == "public")
            .filter(|e| e.date >= from && e.date <= until)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.date);
        events.truncate(limit as usize);
        Ok(events)
    }

    async fn recent_opportunities(
        &self,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TickerResult<Vec<Opportunity>> {
        let mut jobs: Vec<Opportunity> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.status == "active" && j.is_active && j.created_at >= since)
            .filter(|j| j.deadline.is_some_and(|d| d >= now))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| {
            b.is_featured
                .cmp(&a.is_featured)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        jobs.truncate(limit as usize);
        Ok(jobs)
    }
}
