use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::format_float;
use crate::model::{dominant_share, AudienceSnapshot, Platform, Post, Share};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub min_tag_posts: u32,
    pub top_tags: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_tag_posts: 2,
            top_tags: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformPerformance {
    pub platform: Platform,
    pub posts: u32,
    pub engagement: u64,
    pub average_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagPerformance {
    pub tag: String,
    pub posts: u32,
    pub engagement: u64,
    pub average_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceSummary {
    pub platform: Platform,
    pub followers: u64,
    pub follower_growth: i64,
    pub top_age_group: Option<Share>,
    pub top_country: Option<Share>,
    pub most_active_time: Option<Share>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Insights {
    pub best_platform: Option<PlatformPerformance>,
    pub top_hashtags: Vec<HashtagPerformance>,
    pub audience: Vec<AudienceSummary>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InsightSynthesizer {
    config: InsightConfig,
}

impl InsightSynthesizer {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(&self, posts: &[Post], snapshots: &[AudienceSnapshot]) -> Insights {
        let best_platform = best_platform(&platform_performance(posts));
        let top_hashtags = self.top_hashtags(posts);
        let audience = latest_audience(snapshots);

        let mut messages = Vec::new();
        if let Some(best) = best_platform.as_ref() {
            messages.push(format!(
                "{} is your best performing platform with {} engagements per post.",
                best.platform.label(),
                format_float(best.average_engagement, 0)
            ));
        }
        if !top_hashtags.is_empty() {
            let names: Vec<String> = top_hashtags.iter().map(|tag| format!("#{}", tag.tag)).collect();
            messages.push(format!("Your top hashtags are {}.", names.join(", ")));
        }
        for summary in &audience {
            messages.extend(audience_messages(summary));
        }

        Insights {
            best_platform,
            top_hashtags,
            audience,
            messages,
        }
    }

    /// Tags on fewer than `min_tag_posts` posts are never ranked.
    pub fn top_hashtags(&self, posts: &[Post]) -> Vec<HashtagPerformance> {
        let mut rows: Vec<HashtagPerformance> = Vec::new();

        for post in posts {
            let mut seen: HashSet<String> = HashSet::new();
            for raw in &post.tags {
                let tag = normalize_tag(raw);
                if tag.is_empty() || !seen.insert(tag.clone()) {
                    continue;
                }
                match rows.iter_mut().find(|row| row.tag == tag) {
                    Some(row) => {
                        row.posts += 1;
                        row.engagement += post.engagement();
                    }
                    None => rows.push(HashtagPerformance {
                        tag,
                        posts: 1,
                        engagement: post.engagement(),
                        average_engagement: 0.0,
                    }),
                }
            }
        }

        let min_posts = self.config.min_tag_posts.max(1);
        rows.retain(|row| row.posts >= min_posts);
        for row in rows.iter_mut() {
            row.average_engagement = row.engagement as f64 / row.posts as f64;
        }
        rows.sort_by(|a, b| b.average_engagement.total_cmp(&a.average_engagement));
        rows.truncate(self.config.top_tags);
        rows
    }
}

/// Per-platform totals in canonical platform order; platforms without posts
/// are left out.
pub fn platform_performance(posts: &[Post]) -> Vec<PlatformPerformance> {
    Platform::ALL
        .iter()
        .filter_map(|platform| {
            let mut count = 0u32;
            let mut engagement = 0u64;
            for post in posts.iter().filter(|post| post.platform == *platform) {
                count += 1;
                engagement += post.engagement();
            }
            if count == 0 {
                return None;
            }
            Some(PlatformPerformance {
                platform: *platform,
                posts: count,
                engagement,
                average_engagement: engagement as f64 / count as f64,
            })
        })
        .collect()
}

/// Highest average wins; on a tie the earlier platform in canonical order stays.
pub fn best_platform(rows: &[PlatformPerformance]) -> Option<PlatformPerformance> {
    let mut best: Option<&PlatformPerformance> = None;
    for row in rows {
        match best {
            Some(current) if row.average_engagement <= current.average_engagement => {}
            _ => best = Some(row),
        }
    }
    best.cloned()
}

/// Most recent snapshot per platform, summarised in canonical platform order.
pub fn latest_audience(snapshots: &[AudienceSnapshot]) -> Vec<AudienceSummary> {
    Platform::ALL
        .iter()
        .filter_map(|platform| {
            let latest = snapshots
                .iter()
                .filter(|snapshot| snapshot.platform == *platform)
                .fold(None::<&AudienceSnapshot>, |best, snapshot| match best {
                    Some(current) if snapshot.observed_on <= current.observed_on => Some(current),
                    _ => Some(snapshot),
                })?;
            Some(AudienceSummary {
                platform: *platform,
                followers: latest.followers,
                follower_growth: latest.follower_growth,
                top_age_group: dominant_share(&latest.age_groups).cloned(),
                top_country: dominant_share(&latest.countries).cloned(),
                most_active_time: dominant_share(&latest.active_times).cloned(),
            })
        })
        .collect()
}

fn audience_messages(summary: &AudienceSummary) -> Vec<String> {
    let platform = summary.platform.label();
    let mut messages = Vec::new();

    if let Some(age) = summary.top_age_group.as_ref() {
        messages.push(format!(
            "Most of your {} audience is aged {} ({}%).",
            platform,
            age.label,
            format_float(age.percentage, 0)
        ));
    }
    if let Some(country) = summary.top_country.as_ref() {
        messages.push(format!(
            "Your {} audience is concentrated in {} ({}%).",
            platform,
            country.label,
            format_float(country.percentage, 0)
        ));
    }
    if let Some(active) = summary.most_active_time.as_ref() {
        messages.push(format!(
            "Your {} audience is most active in the {}.",
            platform,
            active.label.to_lowercase()
        ));
    }
    if summary.follower_growth > 0 {
        messages.push(format!(
            "You gained {} {} followers in the latest period.",
            summary.follower_growth, platform
        ));
    }

    messages
}

fn normalize_tag(raw: &str) -> String {
    raw.trim().trim_start_matches('#').trim().to_lowercase()
}
