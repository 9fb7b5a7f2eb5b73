use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use engagement_engine::aggregate::{bucket_by_content_type, bucket_by_platform_slot, bucket_by_slot};
use engagement_engine::{DayOfWeek, Platform, Post, PostStatus};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    // January 2024 starts on a Monday.
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn published(id: &str, platform: Platform, when: DateTime<Utc>, likes: u64) -> Post {
    Post {
        id: id.to_string(),
        user_id: "user".to_string(),
        platform,
        status: PostStatus::Published,
        published_at: Some(when),
        likes,
        comments: 0,
        shares: 0,
        impressions: 0,
        reach: 0,
        tags: Vec::new(),
        content_type: None,
    }
}

#[test]
fn skips_posts_that_were_not_published() {
    let mut draft = published("draft", Platform::Instagram, at(3, 18), 50);
    draft.status = PostStatus::Draft;
    let mut missing_time = published("missing", Platform::Instagram, at(3, 18), 50);
    missing_time.published_at = None;
    let live = published("live", Platform::Instagram, at(3, 18), 20);

    let buckets = bucket_by_platform_slot(&[draft, missing_time, live], Tz::UTC);

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].posts, 1);
    assert_eq!(buckets[0].engagement, 20);
}

#[test]
fn every_bucket_has_posts_and_an_average() {
    let posts = vec![
        published("a", Platform::Instagram, at(3, 18), 100),
        published("b", Platform::Instagram, at(10, 18), 50),
        published("c", Platform::Facebook, at(5, 9), 7),
        published("d", Platform::Twitter, at(6, 23), 0),
    ];

    let buckets = bucket_by_platform_slot(&posts, Tz::UTC);

    assert_eq!(buckets.len(), 3);
    for bucket in &buckets {
        assert!(bucket.posts >= 1);
        assert!(bucket.average().is_finite());
    }
    let wednesday = buckets
        .iter()
        .find(|bucket| bucket.platform == Some(Platform::Instagram))
        .unwrap();
    assert_eq!(wednesday.day, DayOfWeek::Wednesday);
    assert_eq!(wednesday.hour, 18);
    assert_eq!(wednesday.posts, 2);
    assert!((wednesday.average() - 75.0).abs() < 1e-6);
}

#[test]
fn counts_engagement_as_likes_comments_and_shares() {
    let mut post = published("a", Platform::Linkedin, at(2, 8), 10);
    post.comments = 4;
    post.shares = 3;
    post.impressions = 1_000;
    post.reach = 900;

    let buckets = bucket_by_platform_slot(&[post], Tz::UTC);

    assert_eq!(buckets[0].engagement, 17);
}

#[test]
fn derives_day_and_hour_in_the_given_timezone() {
    // Thursday 02:00 UTC is Wednesday 21:00 in New York.
    let post = published("a", Platform::Twitter, at(4, 2), 10);

    let utc = bucket_by_platform_slot(std::slice::from_ref(&post), Tz::UTC);
    let new_york = bucket_by_platform_slot(&[post], chrono_tz::America::New_York);

    assert_eq!(utc[0].day, DayOfWeek::Thursday);
    assert_eq!(utc[0].hour, 2);
    assert_eq!(new_york[0].day, DayOfWeek::Wednesday);
    assert_eq!(new_york[0].hour, 21);
}

#[test]
fn aggregation_is_deterministic() {
    let posts = vec![
        published("a", Platform::Linkedin, at(1, 8), 3),
        published("b", Platform::Instagram, at(7, 20), 9),
        published("c", Platform::Facebook, at(3, 12), 4),
        published("d", Platform::Instagram, at(2, 10), 1),
    ];

    let first = bucket_by_platform_slot(&posts, Tz::UTC);
    let second = bucket_by_platform_slot(&posts, Tz::UTC);

    assert_eq!(first, second);
    assert_eq!(first[0].platform, Some(Platform::Instagram));
    assert_eq!(first[0].day, DayOfWeek::Tuesday);
    assert_eq!(first.last().unwrap().platform, Some(Platform::Linkedin));
}

#[test]
fn empty_input_yields_no_buckets() {
    assert!(bucket_by_platform_slot(&[], Tz::UTC).is_empty());
    assert!(bucket_by_slot(&[], Tz::UTC).is_empty());
    assert!(bucket_by_content_type(&[]).is_empty());
}

#[test]
fn cross_platform_buckets_pool_every_platform() {
    let posts = vec![
        published("a", Platform::Instagram, at(3, 18), 100),
        published("b", Platform::Twitter, at(3, 18), 20),
    ];

    let buckets = bucket_by_slot(&posts, Tz::UTC);

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].platform, None);
    assert_eq!(buckets[0].posts, 2);
    assert!((buckets[0].average() - 60.0).abs() < 1e-6);
}

#[test]
fn content_types_rank_by_average_and_default_to_text() {
    let mut video = published("a", Platform::Instagram, at(1, 9), 90);
    video.content_type = Some("video".to_string());
    let mut image = published("b", Platform::Instagram, at(1, 10), 40);
    image.content_type = Some("image".to_string());
    let plain = published("c", Platform::Twitter, at(1, 11), 40);
    let mut blank = published("d", Platform::Twitter, at(1, 12), 40);
    blank.content_type = Some("  ".to_string());

    let rows = bucket_by_content_type(&[image, plain, video, blank]);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].content_type, "video");
    // Ties keep first-seen order.
    assert_eq!(rows[1].content_type, "image");
    assert_eq!(rows[2].content_type, "text");
    assert_eq!(rows[2].posts, 2);
    assert!((rows[2].average_engagement - 40.0).abs() < 1e-6);
}
