use chrono::{Datelike, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{DayOfWeek, Platform, Post};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub day: DayOfWeek,
    pub hour: u8,
    /// `None` for cross-platform buckets.
    pub platform: Option<Platform>,
    pub posts: u32,
    pub engagement: u64,
}

impl TimeBucket {
    pub fn average(&self) -> f64 {
        self.engagement as f64 / self.posts.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypePerformance {
    pub content_type: String,
    pub posts: u32,
    pub engagement: u64,
    pub average_engagement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SlotKey {
    platform: Option<Platform>,
    day: DayOfWeek,
    hour: u8,
}

/// Buckets keyed by (platform, day, hour).
pub fn bucket_by_platform_slot(posts: &[Post], tz: Tz) -> Vec<TimeBucket> {
    accumulate_slots(posts, tz, |post| Some(post.platform))
}

/// Buckets keyed by (day, hour), pooling every platform.
pub fn bucket_by_slot(posts: &[Post], tz: Tz) -> Vec<TimeBucket> {
    accumulate_slots(posts, tz, |_| None)
}

fn accumulate_slots<F>(posts: &[Post], tz: Tz, platform_of: F) -> Vec<TimeBucket>
where
    F: Fn(&Post) -> Option<Platform>,
{
    let mut cells: BTreeMap<SlotKey, (u32, u64)> = BTreeMap::new();

    for post in posts {
        let Some(published) = post.published_time() else {
            continue;
        };
        let local = published.with_timezone(&tz);
        let key = SlotKey {
            platform: platform_of(post),
            day: DayOfWeek::from(local.weekday()),
            hour: local.hour() as u8,
        };
        let cell = cells.entry(key).or_insert((0, 0));
        cell.0 += 1;
        cell.1 += post.engagement();
    }

    cells
        .into_iter()
        .map(|(key, (posts, engagement))| TimeBucket {
            day: key.day,
            hour: key.hour,
            platform: key.platform,
            posts,
            engagement,
        })
        .collect()
}

/// Content-type ranking, best average first. Ties keep first-seen order.
pub fn bucket_by_content_type(posts: &[Post]) -> Vec<ContentTypePerformance> {
    let mut rows: Vec<ContentTypePerformance> = Vec::new();

    for post in posts {
        if post.published_time().is_none() {
            continue;
        }
        let label = post.content_type_label();
        match rows.iter_mut().find(|row| row.content_type == label) {
            Some(row) => {
                row.posts += 1;
                row.engagement += post.engagement();
            }
            None => rows.push(ContentTypePerformance {
                content_type: label.to_string(),
                posts: 1,
                engagement: post.engagement(),
                average_engagement: 0.0,
            }),
        }
    }

    for row in rows.iter_mut() {
        row.average_engagement = row.engagement as f64 / row.posts as f64;
    }

    rows.sort_by(|a, b| b.average_engagement.total_cmp(&a.average_engagement));
    rows
}
