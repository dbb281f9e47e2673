use chrono::{DateTime, Utc};

use crate::error::TickerResult;
use crate::models::ticker::{CreateTickerRequest, NewTickerItem, TickerVariant};

/// (title, message, type, variant, priority, action url, action label)
const SAMPLES: &[(&str, &str, &str, TickerVariant, i32, &str, &str)] = &[
    (
        "Welcome to Alumni Connect - Your Professional Network!",
        "Join thousands of alumni connecting, sharing opportunities, and building their careers together",
        "announcement",
        TickerVariant::Success,
        5,
        "/dashboard",
        "Get Started",
    ),
    (
        "Explore Career Opportunities",
        "Browse latest job openings posted by alumni and top companies - Your next career move awaits!",
        "job",
        TickerVariant::Info,
        5,
        "/opportunities",
        "View Jobs",
    ),
    (
        "Upcoming Alumni Events",
        "Join networking meetups, workshops, and reunions - Stay connected with your batch mates!",
        "event",
        TickerVariant::Info,
        4,
        "/events",
        "View Events",
    ),
    (
        "Connect with Alumni Directory",
        "Find alumni from your department, batch, and company - Expand your professional network",
        "announcement",
        TickerVariant::Info,
        4,
        "/alumni",
        "Browse Alumni",
    ),
    (
        "Celebrating Alumni Success Stories",
        "From startups to Fortune 500 - Our alumni are making an impact worldwide!",
        "achievement",
        TickerVariant::Success,
        3,
        "/alumni",
        "Read Stories",
    ),
    (
        "Share Your Knowledge - Create a Post",
        "Share your experiences, tips, and insights with the community. Your story matters!",
        "announcement",
        TickerVariant::Info,
        3,
        "/dashboard",
        "Post Now",
    ),
    (
        "Get Real-time Notifications",
        "Never miss important updates - Enable notifications for posts, events, and opportunities",
        "announcement",
        TickerVariant::Warning,
        2,
        "/settings",
        "Enable",
    ),
    (
        "Alumni Connect - Built by Students, For Alumni",
        "A platform to bridge the gap between students and alumni. Together we grow stronger!",
        "news",
        TickerVariant::Success,
        2,
        "/",
        "Learn More",
    ),
];

/// The starter set of manual items, open-ended and visible from `now`.
pub fn sample_items(now: DateTime<Utc>) -> TickerResult<Vec<NewTickerItem>> {
    SAMPLES
        .iter()
        .map(|&(title, message, kind, variant, priority, url, label)| {
            CreateTickerRequest {
                title: title.into(),
                message: message.into(),
                kind: kind.into(),
                variant,
                priority,
                action_url: Some(url.into()),
                action_label: Some(label.into()),
                icon: None,
                is_active: true,
                start_date: Some(now),
                end_date: None,
            }
            .into_new_item(now)
        })
        .collect()
}
