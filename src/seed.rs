use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::model::{AudienceSnapshot, Platform, Post, PostStatus, Share};

const SAMPLE_DAYS: i64 = 30;
const POSTS_PER_DAY: usize = 2;

const CONTENT_TYPES: [&str; 4] = ["image", "video", "carousel", "text"];
const TAGS: [&str; 8] = [
    "marketing", "growth", "tips", "launch", "behindthescenes", "sale", "community", "summer",
];

pub fn generate_sample_posts(user_id: &str, now: DateTime<Utc>, seed: u64) -> Vec<Post> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut posts = Vec::new();

    for day in 0..SAMPLE_DAYS {
        for slot in 0..POSTS_PER_DAY {
            let platform = Platform::ALL[rng.gen_range(0..Platform::ALL.len())];
            let hour = rng.gen_range(7..22);
            let published_at = now - Duration::days(day + 1) - Duration::hours(hour);
            let impressions = rng.gen_range(400..5_000u64);
            let lift = peak_lift(published_at);
            let likes = ((impressions as f64) * rng.gen_range(0.02..0.08) * lift) as u64;
            let comments = likes / rng.gen_range(5..12u64);
            let shares = likes / rng.gen_range(8..20u64);

            let tag_count = rng.gen_range(0..4usize);
            let tags = (0..tag_count)
                .map(|_| TAGS[rng.gen_range(0..TAGS.len())].to_string())
                .collect();

            posts.push(Post {
                id: format!("sample_{}_{}", day, slot),
                user_id: user_id.to_string(),
                platform,
                status: PostStatus::Published,
                published_at: Some(published_at),
                likes,
                comments,
                shares,
                impressions,
                reach: (impressions as f64 * rng.gen_range(0.6..0.95)) as u64,
                tags,
                content_type: Some(CONTENT_TYPES[rng.gen_range(0..CONTENT_TYPES.len())].to_string()),
            });
        }
    }

    posts
}

pub fn generate_sample_audience(user_id: &str, now: DateTime<Utc>, seed: u64) -> Vec<AudienceSnapshot> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));

    Platform::ALL
        .iter()
        .map(|platform| {
            let followers = rng.gen_range(500..20_000u64);
            AudienceSnapshot {
                user_id: user_id.to_string(),
                platform: *platform,
                observed_on: now.date_naive(),
                followers,
                follower_growth: rng.gen_range(-20..(followers as i64 / 20)),
                age_groups: normalize(vec![
                    Share::new("18-24", rng.gen_range(10.0..30.0)),
                    Share::new("25-34", rng.gen_range(20.0..40.0)),
                    Share::new("35-44", rng.gen_range(10.0..25.0)),
                    Share::new("45+", rng.gen_range(5.0..15.0)),
                ]),
                genders: normalize(vec![
                    Share::new("female", rng.gen_range(35.0..60.0)),
                    Share::new("male", rng.gen_range(35.0..60.0)),
                    Share::new("other", rng.gen_range(1.0..5.0)),
                ]),
                countries: normalize(vec![
                    Share::new("United States", rng.gen_range(20.0..45.0)),
                    Share::new("United Kingdom", rng.gen_range(5.0..20.0)),
                    Share::new("Canada", rng.gen_range(5.0..15.0)),
                    Share::new("Germany", rng.gen_range(3.0..12.0)),
                ]),
                active_times: normalize(vec![
                    Share::new("Morning", rng.gen_range(10.0..30.0)),
                    Share::new("Afternoon", rng.gen_range(15.0..35.0)),
                    Share::new("Evening", rng.gen_range(20.0..40.0)),
                    Share::new("Night", rng.gen_range(5.0..15.0)),
                ]),
            }
        })
        .collect()
}

/// Morning and evening posts get more engagement, so seeded data has a shape.
fn peak_lift(published_at: DateTime<Utc>) -> f64 {
    use chrono::Timelike;

    let hour = published_at.hour() as f64;
    let morning = gaussian(hour, 9.0, 3.0);
    let evening = gaussian(hour, 19.0, 3.0);
    0.6 + morning.max(evening)
}

fn gaussian(x: f64, center: f64, width: f64) -> f64 {
    let z = (x - center) / width;
    (-z * z).exp()
}

fn normalize(mut shares: Vec<Share>) -> Vec<Share> {
    let total: f64 = shares.iter().map(|share| share.percentage).sum();
    if total > 0.0 {
        for share in shares.iter_mut() {
            share.percentage = (share.percentage / total * 1000.0).round() / 10.0;
        }
    }
    shares
}
