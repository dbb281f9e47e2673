use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use redis::Client as RedisClient;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alumni_ticker_api::{
    config::Config,
    db, routes,
    services::{
        cache::{FeedCache, RedisFeedCache},
        reconcile,
    },
    store::{PgTickerStore, TickerStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url, 20).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let store: Arc<dyn TickerStore> =
        Arc::new(PgTickerStore::new(pool, config.ticker_strict_records));

    let cache: Option<Arc<dyn FeedCache>> =
        match (&config.redis_url, config.ticker_cache_ttl_secs) {
            (Some(url), ttl) if ttl > 0 => {
                let client = RedisClient::open(url.as_str())?;
                let conn = client.get_multiplexed_async_connection().await?;
                info!("Redis connected, ticker feed cached for {}s", ttl);
                Some(Arc::new(RedisFeedCache::new(conn, ttl)))
            }
            _ => {
                info!("Redis not configured, ticker feed caching disabled");
                None
            }
        };

    if config.ticker_reconcile_interval_secs > 0 {
        reconcile::start(
            store.clone(),
            cache.clone(),
            config.ticker_reconcile_interval_secs,
        );
    }

    let state = AppState {
        store,
        cache,
        config: config.clone(),
    };

    // Allow the app base domain and its subdomains; localhost is always allowed.
    let base = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
            return true;
        }
        if o == base {
            return true;
        }
        if let Some(idx) = base.find("://") {
            let after_scheme = &base[idx + 3..];
            let domain = after_scheme.split('/').next().unwrap_or(after_scheme);
            let domain_clean = domain.split(':').next().unwrap_or(domain);
            if o.ends_with(&format!(".{domain_clean}")) {
                return true;
            }
        }
        false
    });

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-admin-key"),
        ]))
        .allow_origin(cors_origin);

    let app = routes::router(state).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Alumni Connect ticker API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
