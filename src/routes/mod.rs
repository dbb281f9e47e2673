pub mod health;
pub mod metrics;
pub mod ticker;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// All HTTP routes, without CORS (added by the binary from config).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        // Public feed + admin create
        .route("/ticker", get(ticker::active_feed).post(ticker::create_item))
        // Admin utilities
        .route("/ticker/admin/all", get(ticker::list_all))
        .route("/ticker/admin/clear-cache", post(ticker::clear_cache))
        .route("/ticker/admin/reconcile", post(ticker::reconcile_now))
        // Single item
        .route(
            "/ticker/{id}",
            get(ticker::get_item)
                .put(ticker::update_item)
                .delete(ticker::delete_item),
        )
        .route("/ticker/{id}/toggle", patch(ticker::toggle_item))
        // Engagement tracking (public)
        .route("/ticker/{id}/track-view", post(ticker::track_view))
        .route("/ticker/{id}/track-click", post(ticker::track_click))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
