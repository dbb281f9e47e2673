//! Ticker seed script
//!
//! Inserts the starter set of manual ticker items, visible immediately and
//! without an end date.
//!
//! Usage:
//!   DATABASE_URL=... ./seed-ticker [--replace]
//!
//!   --replace  : delete every existing ticker item first

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use alumni_ticker_api::db;
use alumni_ticker_api::services::seed::sample_items;
use alumni_ticker_api::store::{PgTickerStore, TickerStore};

#[derive(Parser)]
#[command(name = "seed-ticker", about = "Insert the starter ticker items")]
struct Args {
    /// Delete existing ticker items before inserting
    #[arg(long)]
    replace: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL required")?;
    let pool = db::create_pool(&database_url, 5)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool).await?;

    let store = PgTickerStore::new(pool, true);

    if args.replace {
        let removed = store.delete_all().await?;
        tracing::info!("Removed {} existing ticker item(s)", removed);
    }

    let now = Utc::now();
    let items = sample_items(now)?;
    for item in items {
        let stored = store
            .insert_item(item)
            .await
            .context("Failed to insert ticker item")?;
        tracing::info!("Added [{}] {}", stored.priority, stored.title);
    }

    tracing::info!("Ticker seed completed");
    Ok(())
}
