// Library exports for binary tools and tests
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use config::Config;
use services::cache::FeedCache;
use store::TickerStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TickerStore>,
    /// `None` when Redis is not configured.
    pub cache: Option<Arc<dyn FeedCache>>,
    pub config: Arc<Config>,
}
