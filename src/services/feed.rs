//! Public ticker feed: manual items merged with entries derived from
//! upcoming events and fresh job openings.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::config::Config;
use crate::error::TickerResult;
use crate::models::{
    feed::{Event, FeedEntry, Opportunity},
    ticker::{TickerSource, TickerVariant},
};
use crate::services::selector;
use crate::store::TickerStore;

/// Maximum entries contributed by each derived source.
const DERIVED_SOURCE_LIMIT: i64 = 5;

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub manual_limit: i64,
    pub feed_limit: usize,
    pub events_window: Duration,
    pub jobs_window: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            manual_limit: 10,
            feed_limit: 20,
            events_window: Duration::days(7),
            jobs_window: Duration::days(7),
        }
    }
}

impl From<&Config> for FeedSettings {
    fn from(config: &Config) -> Self {
        Self {
            manual_limit: config.ticker_manual_limit,
            feed_limit: config.ticker_feed_limit,
            ..Self::default()
        }
    }
}

/// Build the feed as seen at `now`.
///
/// A failure reading the ticker catalog is returned to the caller. Event and
/// job sources are optional: when they fail the feed is built without them.
pub async fn aggregate(
    store: &dyn TickerStore,
    settings: &FeedSettings,
    now: DateTime<Utc>,
) -> TickerResult<Vec<FeedEntry>> {
    let catalog = store.catalog().await?;
    let manual = selector::select(&catalog, now, settings.manual_limit)?;
    let manual: Vec<FeedEntry> = manual.iter().map(FeedEntry::from).collect();

    let events = match store
        .upcoming_events(now, now + settings.events_window, DERIVED_SOURCE_LIMIT)
        .await
    {
        Ok(events) => events.iter().map(event_entry).collect(),
        Err(e) => {
            warn!("Ticker feed: events unavailable: {}", e);
            Vec::new()
        }
    };

    let jobs = match store
        .recent_opportunities(now - settings.jobs_window, now, DERIVED_SOURCE_LIMIT)
        .await
    {
        Ok(jobs) => jobs.iter().map(job_entry).collect(),
        Err(e) => {
            warn!("Ticker feed: opportunities unavailable: {}", e);
            Vec::new()
        }
    };

    Ok(merge(manual, events, jobs, settings.feed_limit))
}

/// Concatenate sources and order by priority. At equal priority manual
/// entries come first; everything else keeps its source order.
pub fn merge(
    manual: Vec<FeedEntry>,
    events: Vec<FeedEntry>,
    jobs: Vec<FeedEntry>,
    limit: usize,
) -> Vec<FeedEntry> {
    let mut all: Vec<FeedEntry> = manual.into_iter().chain(events).chain(jobs).collect();
    all.sort_by(|a, b| {
        b.priority.cmp(&a.priority).then_with(|| {
            let a_manual = a.source == TickerSource::Manual;
            let b_manual = b.source == TickerSource::Manual;
            b_manual.cmp(&a_manual)
        })
    });
    all.truncate(limit);
    all
}

pub fn event_entry(event: &Event) -> FeedEntry {
    let mut message = format!(
        "{} on {}",
        event.kind.as_deref().unwrap_or("Event"),
        event.date.format("%b %-d")
    );
    if let Some(time) = event.start_time.as_deref().filter(|t| !t.is_empty()) {
        message.push_str(&format!(" at {time}"));
    }
    if let Some(venue) = event.venue.as_deref().filter(|v| !v.is_empty()) {
        message.push_str(&format!(" | {venue}"));
    }

    FeedEntry {
        id: format!("event-{}", event.id),
        original_id: event.id,
        title: format!("Upcoming Event: {}", event.title),
        message,
        kind: "event".into(),
        source: TickerSource::AutoEvent,
        variant: TickerVariant::Info,
        action_url: Some(format!("/events/{}", event.id)),
        action_label: Some("View Details".into()),
        priority: 4,
        icon: Some("Calendar".into()),
        view_count: None,
        click_count: None,
    }
}

pub fn job_entry(job: &Opportunity) -> FeedEntry {
    let heading = if job.category.as_deref() == Some("Internship") {
        "New Internship"
    } else {
        "New Job"
    };
    let mut message = format!(
        "{} | {}",
        job.company,
        job.location.as_deref().unwrap_or("Remote")
    );
    if let Some(job_type) = job.job_type.as_deref().filter(|t| !t.is_empty()) {
        message.push_str(&format!(" | {job_type}"));
    }

    FeedEntry {
        id: format!("job-{}", job.id),
        original_id: job.id,
        title: format!("{heading}: {}", job.title),
        message,
        kind: "job".into(),
        source: TickerSource::AutoOpportunity,
        variant: if job.is_featured {
            TickerVariant::Success
        } else {
            TickerVariant::Info
        },
        action_url: Some(format!("/opportunities/{}", job.id)),
        action_label: Some("Apply Now".into()),
        priority: if job.is_featured { 4 } else { 3 },
        icon: Some("Briefcase".into()),
        view_count: None,
        click_count: None,
    }
}

/// Derived entries are addressed as `event-<uuid>` / `job-<uuid>` and have no counters.
pub fn is_derived_id(id: &str) -> bool {
    id.starts_with("event-") || id.starts_with("job-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticker::TickerItem;
    use crate::store::memory::MemoryStore;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn manual(title: &str, priority: i32, now: DateTime<Utc>) -> TickerItem {
        TickerItem {
            id: Uuid::new_v4(),
            title: title.into(),
            message: "m".into(),
            kind: "announcement".into(),
            source: TickerSource::Manual,
            variant: TickerVariant::Info,
            priority,
            action_url: None,
            action_label: None,
            icon: None,
            is_active: true,
            start_date: now - Duration::hours(1),
            end_date: None,
            view_count: 3,
            click_count: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn event(title: &str, date: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: title.into(),
            kind: Some("Workshop".into()),
            date,
            start_time: Some("18:30".into()),
            venue: Some("Main Hall".into()),
            status: "upcoming".into(),
            visibility: "public".into(),
        }
    }

    fn job(title: &str, featured: bool, now: DateTime<Utc>) -> Opportunity {
        Opportunity {
            id: Uuid::new_v4(),
            title: title.into(),
            company: "Acme".into(),
            location: None,
            category: Some("Internship".into()),
            job_type: Some("Full-time".into()),
            is_featured: featured,
            status: "active".into(),
            is_active: true,
            created_at: now - Duration::days(1),
            deadline: Some(now + Duration::days(10)),
        }
    }

    #[test]
    fn test_event_entry_rendering() {
        let date = Utc.with_ymd_and_hms(2026, 3, 5, 17, 0, 0).unwrap();
        let e = event("Alumni Meetup", date);
        let entry = event_entry(&e);
        assert_eq!(entry.id, format!("event-{}", e.id));
        assert_eq!(entry.title, "Upcoming Event: Alumni Meetup");
        assert_eq!(entry.message, "Workshop on Mar 5 at 18:30 | Main Hall");
        assert_eq!(entry.priority, 4);
        assert_eq!(entry.source, TickerSource::AutoEvent);
        assert_eq!(entry.action_url.as_deref(), Some(format!("/events/{}", e.id).as_str()));
    }

    #[test]
    fn test_event_entry_without_optional_parts() {
        let mut e = event("Reunion", Utc.with_ymd_and_hms(2026, 12, 24, 9, 0, 0).unwrap());
        e.kind = None;
        e.start_time = None;
        e.venue = None;
        assert_eq!(event_entry(&e).message, "Event on Dec 24");
    }

    #[test]
    fn test_job_entry_rendering() {
        let now = Utc::now();
        let featured = job_entry(&job("Data Intern", true, now));
        assert_eq!(featured.title, "New Internship: Data Intern");
        assert_eq!(featured.message, "Acme | Remote | Full-time");
        assert_eq!(featured.priority, 4);
        assert_eq!(featured.variant, TickerVariant::Success);

        let mut plain = job("Engineer", false, now);
        plain.category = Some("Full-time".into());
        plain.location = Some("Pune".into());
        plain.job_type = None;
        let plain = job_entry(&plain);
        assert_eq!(plain.title, "New Job: Engineer");
        assert_eq!(plain.message, "Acme | Pune");
        assert_eq!(plain.priority, 3);
        assert_eq!(plain.variant, TickerVariant::Info);
    }

    #[test]
    fn test_merge_prefers_manual_on_ties() {
        let now = Utc::now();
        let manual_entries = vec![FeedEntry::from(&manual("m4", 4, now))];
        let events = vec![event_entry(&event("e", now + Duration::days(1)))];
        let jobs = vec![job_entry(&job("j", true, now))];

        let merged = merge(jobs.clone(), events.clone(), manual_entries.clone(), 10);
        assert_eq!(merged[0].title, "m4");
        assert_eq!(merged[1].source, TickerSource::AutoOpportunity);
        assert_eq!(merged[2].source, TickerSource::AutoEvent);

        let truncated = merge(manual_entries, events, jobs, 2);
        assert_eq!(truncated.len(), 2);
    }

    #[test]
    fn test_derived_ids() {
        assert!(is_derived_id("event-123"));
        assert!(is_derived_id("job-abc"));
        assert!(!is_derived_id(&Uuid::new_v4().to_string()));
    }

    #[tokio::test]
    async fn test_aggregate_combines_sources() {
        let now = Utc::now();
        let store = MemoryStore::with_items(vec![
            manual("top", 5, now),
            manual("low", 1, now),
        ]);
        store.push_event(event("soon", now + Duration::days(2)));
        store.push_event(event("too far", now + Duration::days(30)));
        store.push_job(job("fresh", false, now));

        let mut stale = job("stale", true, now);
        stale.created_at = now - Duration::days(20);
        store.push_job(stale);

        let mut no_deadline = job("open", true, now);
        no_deadline.deadline = None;
        store.push_job(no_deadline);

        let feed = aggregate(&store, &FeedSettings::default(), now).await.unwrap();
        let titles: Vec<&str> = feed.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["top", "Upcoming Event: soon", "New Internship: fresh", "low"]
        );
        assert_eq!(feed[0].view_count, Some(3));
        assert_eq!(feed[1].view_count, None);
    }

    #[tokio::test]
    async fn test_aggregate_respects_manual_limit() {
        let now = Utc::now();
        let store = MemoryStore::with_items((0..15).map(|i| manual(&format!("m{i}"), 2, now)).collect());
        let settings = FeedSettings {
            manual_limit: 10,
            ..FeedSettings::default()
        };
        let feed = aggregate(&store, &settings, now).await.unwrap();
        assert_eq!(feed.len(), 10);
    }
}
