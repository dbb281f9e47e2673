pub mod cache;
pub mod feed;
pub mod metrics;
pub mod reconcile;
pub mod seed;
pub mod selector;
pub mod ticker;
