use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Gauge};

lazy_static! {
    // ── Feed ────────────────────────────────────────────────────────────────
    pub static ref FEED_REQUESTS_COUNTER: CounterVec = register_counter_vec!(
        "ticker_feed_requests_total",
        "Public feed requests by cache outcome",
        &["cache"]
    ).unwrap();

    pub static ref FEED_SIZE_GAUGE: Gauge = register_gauge!(
        "ticker_feed_entries",
        "Entries in the last aggregated feed"
    ).unwrap();

    // ── Engagement ──────────────────────────────────────────────────────────
    pub static ref TRACKING_COUNTER: CounterVec = register_counter_vec!(
        "ticker_tracking_events_total",
        "View and click tracking calls by counter and outcome",
        &["counter", "outcome"]
    ).unwrap();

    // ── Administration ──────────────────────────────────────────────────────
    pub static ref ADMIN_ACTIONS_COUNTER: CounterVec = register_counter_vec!(
        "ticker_admin_actions_total",
        "Successful admin mutations by action",
        &["action"]
    ).unwrap();

    pub static ref RECONCILE_DEACTIVATED_COUNTER: Counter = register_counter!(
        "ticker_reconcile_deactivated_total",
        "Expired items deactivated by reconciliation"
    ).unwrap();
}
