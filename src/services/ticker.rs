use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{TickerError, TickerResult},
    models::{
        feed::FeedPage,
        ticker::{
            AdminListQuery, AdminPage, Counter, CreateTickerRequest, TickerItem, TickerSource,
            UpdateTickerRequest,
        },
    },
    services::{
        cache::FeedCache,
        feed::{self, FeedSettings},
        metrics,
    },
    store::TickerStore,
};

pub struct TickerService;

impl TickerService {
    /// Public feed, served from the cache when possible.
    pub async fn feed(
        store: &dyn TickerStore,
        cache: Option<&dyn FeedCache>,
        settings: &FeedSettings,
        now: DateTime<Utc>,
    ) -> TickerResult<FeedPage> {
        if let Some(cache) = cache {
            if let Some(entries) = cache.get().await {
                metrics::FEED_REQUESTS_COUNTER.with_label_values(&["hit"]).inc();
                return Ok(FeedPage {
                    entries,
                    cached: true,
                });
            }
        }

        let entries = feed::aggregate(store, settings, now).await?;
        metrics::FEED_SIZE_GAUGE.set(entries.len() as f64);

        match cache {
            Some(cache) => {
                cache.put(&entries).await;
                metrics::FEED_REQUESTS_COUNTER.with_label_values(&["miss"]).inc();
            }
            None => metrics::FEED_REQUESTS_COUNTER
                .with_label_values(&["disabled"])
                .inc(),
        }

        Ok(FeedPage {
            entries,
            cached: false,
        })
    }

    pub async fn list(store: &dyn TickerStore, query: &AdminListQuery) -> TickerResult<AdminPage> {
        let (page, limit, offset) = query.paging()?;
        let (items, total) = store.list_items(query.is_active, offset, limit).await?;
        Ok(AdminPage {
            items,
            total,
            page,
            pages: (total + limit - 1) / limit,
        })
    }

    pub async fn get(store: &dyn TickerStore, id: Uuid) -> TickerResult<TickerItem> {
        store
            .get_item(id)
            .await?
            .ok_or_else(|| TickerError::NotFound(id.to_string()))
    }

    pub async fn create(
        store: &dyn TickerStore,
        cache: Option<&dyn FeedCache>,
        req: CreateTickerRequest,
        now: DateTime<Utc>,
    ) -> TickerResult<TickerItem> {
        let item = store.insert_item(req.into_new_item(now)?).await?;
        info!("Ticker item {} created: {}", item.id, item.title);
        Self::invalidate(cache, "create").await;
        Ok(item)
    }

    pub async fn update(
        store: &dyn TickerStore,
        cache: Option<&dyn FeedCache>,
        id: Uuid,
        req: UpdateTickerRequest,
    ) -> TickerResult<TickerItem> {
        let current = Self::manual_item(store, id).await?;
        let next = req.apply_to(&current)?;
        let saved = store
            .replace_item(&next)
            .await?
            .ok_or_else(|| TickerError::NotFound(id.to_string()))?;
        Self::invalidate(cache, "update").await;
        Ok(saved)
    }

    pub async fn delete(
        store: &dyn TickerStore,
        cache: Option<&dyn FeedCache>,
        id: Uuid,
    ) -> TickerResult<()> {
        // Only source is checked so that a broken legacy row can still be removed.
        let state = store
            .item_state(id)
            .await?
            .ok_or_else(|| TickerError::NotFound(id.to_string()))?;
        if state.source != TickerSource::Manual {
            return Err(TickerError::NotManual(id));
        }
        if !store.delete_item(id).await? {
            return Err(TickerError::NotFound(id.to_string()));
        }
        info!("Ticker item {} deleted", id);
        Self::invalidate(cache, "delete").await;
        Ok(())
    }

    /// Flip the active flag and return its new value.
    pub async fn toggle(
        store: &dyn TickerStore,
        cache: Option<&dyn FeedCache>,
        id: Uuid,
    ) -> TickerResult<bool> {
        let state = store
            .item_state(id)
            .await?
            .ok_or_else(|| TickerError::NotFound(id.to_string()))?;
        let active = !state.is_active;
        if !store.set_active(id, active).await? {
            return Err(TickerError::NotFound(id.to_string()));
        }
        Self::invalidate(cache, "toggle").await;
        Ok(active)
    }

    /// Record a view or click. Derived entries have no counters and unknown ids
    /// are ignored; failures are logged, never returned.
    pub async fn track(store: &dyn TickerStore, id: &str, counter: Counter) {
        let outcome = if feed::is_derived_id(id) {
            "skipped"
        } else {
            match Uuid::parse_str(id) {
                Ok(uuid) => match store.increment(uuid, counter).await {
                    Ok(true) => "recorded",
                    Ok(false) => "unknown",
                    Err(e) => {
                        warn!("Ticker {} tracking failed for {}: {}", counter.label(), id, e);
                        "failed"
                    }
                },
                Err(_) => "unknown",
            }
        };
        metrics::TRACKING_COUNTER
            .with_label_values(&[counter.label(), outcome])
            .inc();
    }

    pub async fn clear_cache(cache: Option<&dyn FeedCache>) {
        Self::invalidate(cache, "clear_cache").await;
    }

    async fn manual_item(store: &dyn TickerStore, id: Uuid) -> TickerResult<TickerItem> {
        let item = Self::get(store, id).await?;
        if item.source != TickerSource::Manual {
            return Err(TickerError::NotManual(id));
        }
        Ok(item)
    }

    async fn invalidate(cache: Option<&dyn FeedCache>, action: &str) {
        if let Some(cache) = cache {
            cache.clear().await;
        }
        metrics::ADMIN_ACTIONS_COUNTER
            .with_label_values(&[action])
            .inc();
    }
}
