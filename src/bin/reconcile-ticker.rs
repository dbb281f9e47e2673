//! Deactivate expired ticker items and report what the feed shows right now.
//! Safe to run repeatedly (e.g. via cron: 0 * * * * /app/reconcile-ticker)
//!
//! Usage: reconcile-ticker [--dry-run] [--limit N]
//!   --dry-run  : print the plan and the visible items without writing
//!   --limit N  : how many visible items to list (default 10)

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use alumni_ticker_api::db;
use alumni_ticker_api::services::{reconcile, selector};
use alumni_ticker_api::store::{PgTickerStore, TickerStore};

#[derive(Parser)]
#[command(name = "reconcile-ticker", about = "Reconcile ticker item flags with their active window")]
struct Args {
    /// Show what would change without writing
    #[arg(long)]
    dry_run: bool,

    /// Number of visible items to list
    #[arg(long, default_value_t = 10)]
    limit: i64,
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
    // Lenient reads: invalid legacy rows are logged and skipped instead of
    // aborting the tool that is meant to clean them up.
    let store = PgTickerStore::new(pool, false);

    let now = Utc::now();
    tracing::info!("Reference time: {}", now.to_rfc3339());

    let catalog = store.catalog().await?;
    let plan = reconcile::plan(&catalog, now);
    tracing::info!(
        "{} item(s): {} visible, {} scheduled, {} inactive, {} expired but active",
        catalog.len(),
        plan.visible,
        plan.scheduled.len(),
        plan.inactive,
        plan.expired.len()
    );
    for id in &plan.expired {
        tracing::info!("  expired: {}", id);
    }

    if args.dry_run {
        for (i, item) in selector::select(&catalog, now, args.limit)?.iter().enumerate() {
            let end = item
                .end_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "open".into());
            tracing::info!(
                "{}. [{}] {} (start {}, end {})",
                i + 1,
                item.priority,
                item.title,
                item.start_date.to_rfc3339(),
                end
            );
        }
        tracing::info!("Dry run: no changes written");
        return Ok(());
    }

    let report = reconcile::run(&store, now).await?;
    tracing::info!("Deactivated {} expired item(s)", report.deactivated);
    Ok(())
}
