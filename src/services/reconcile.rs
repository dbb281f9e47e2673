//! Keeps stored flags consistent with the visibility rule.
//!
//! Expired items (end date in the past) still marked active are deactivated.
//! The pass is idempotent and driven by an explicit `now`, so it can run on a
//! schedule instead of hand-patching dates when the feed looks empty.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{TickerError, TickerResult};
use crate::models::ticker::TickerItem;
use crate::services::{cache::FeedCache, metrics};
use crate::store::TickerStore;

/// What a reconciliation pass would change, computed from a catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilePlan {
    /// Active items past their end date.
    pub expired: Vec<Uuid>,
    /// Active items whose start date is still ahead. Reported only.
    pub scheduled: Vec<Uuid>,
    pub visible: usize,
    pub inactive: usize,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.expired.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// `None` when the catalog holds rows that fail validation.
    pub plan: Option<ReconcilePlan>,
    pub deactivated: u64,
}

pub fn plan(catalog: &[TickerItem], now: DateTime<Utc>) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    for item in catalog {
        if !item.is_active {
            plan.inactive += 1;
        } else if item.is_expired_at(now) {
            plan.expired.push(item.id);
        } else if item.start_date > now {
            plan.scheduled.push(item.id);
        } else {
            plan.visible += 1;
        }
    }
    plan
}

/// Compute the plan and apply it.
///
/// Invalid stored rows only cost the plan: expiry is a plain column update and
/// still runs, since stale legacy data is what this pass is for.
pub async fn run(store: &dyn TickerStore, now: DateTime<Utc>) -> TickerResult<ReconcileReport> {
    let plan = match store.catalog().await {
        Ok(catalog) => Some(plan(&catalog, now)),
        Err(TickerError::InvalidRecord(reason)) => {
            warn!("Ticker reconcile: catalog unreadable, applying expiry without a plan: {}", reason);
            None
        }
        Err(e) => return Err(e),
    };

    let deactivated = match &plan {
        Some(plan) if plan.is_noop() => 0,
        _ => store.deactivate_expired(now).await?,
    };
    metrics::RECONCILE_DEACTIVATED_COUNTER.inc_by(deactivated as f64);

    Ok(ReconcileReport { plan, deactivated })
}

/// Spawn the periodic reconciliation task. The feed cache is cleared whenever
/// an item gets deactivated.
pub fn start(
    store: Arc<dyn TickerStore>,
    cache: Option<Arc<dyn FeedCache>>,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        loop {
            match run(store.as_ref(), Utc::now()).await {
                Ok(report) if report.deactivated > 0 => {
                    info!(
                        "Ticker reconcile: deactivated {} expired item(s)",
                        report.deactivated
                    );
                    if let Some(cache) = &cache {
                        cache.clear().await;
                    }
                }
                Ok(ReconcileReport {
                    plan: Some(plan), ..
                }) => info!(
                    "Ticker reconcile: nothing to do ({} visible, {} scheduled)",
                    plan.visible,
                    plan.scheduled.len()
                ),
                Ok(_) => info!("Ticker reconcile: nothing to do"),
                Err(e) => warn!("Ticker reconcile failed: {}", e),
            }
            tokio::time::sleep(tokio::time::Duration::from_secs(interval_secs)).await;
        }
    });
}
