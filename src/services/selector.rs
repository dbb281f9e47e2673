//! Ticker feed selection: which items are visible at a given instant, and in
//! what order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::error::{TickerError, TickerResult};
use crate::models::ticker::TickerItem;

/// Return the items of `catalog` visible at `now`, highest priority first,
/// truncated to `limit`.
///
/// Equal priorities are ordered by `start_date`, most recent first. Items that
/// tie on both keep their catalog order. The catalog is never modified.
pub fn select(
    catalog: &[TickerItem],
    now: DateTime<Utc>,
    limit: i64,
) -> TickerResult<Vec<TickerItem>> {
    if limit < 0 {
        return Err(TickerError::invalid(format!(
            "limit must be >= 0, got {limit}"
        )));
    }

    let mut visible: Vec<&TickerItem> = catalog
        .iter()
        .filter(|item| item.is_visible_at(now))
        .collect();
    visible.sort_by(|a, b| rank(a, b));

    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    Ok(visible.into_iter().take(limit).cloned().collect())
}

fn rank(a: &TickerItem, b: &TickerItem) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| b.start_date.cmp(&a.start_date))
}
