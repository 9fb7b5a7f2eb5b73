use chrono::{NaiveDate, TimeZone, Utc};
use engagement_engine::insights::{best_platform, latest_audience, platform_performance};
use engagement_engine::{
    format_float, AudienceSnapshot, InsightConfig, InsightSynthesizer, Platform, Post, PostStatus, Share,
};

fn tagged(id: &str, platform: Platform, engagement: u64, tags: &[&str]) -> Post {
    Post {
        id: id.to_string(),
        user_id: "user".to_string(),
        platform,
        status: PostStatus::Published,
        published_at: Some(Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()),
        likes: engagement,
        comments: 0,
        shares: 0,
        impressions: 500,
        reach: 400,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        content_type: None,
    }
}

fn snapshot(platform: Platform, observed_on: NaiveDate, top_age: &str, country: &str) -> AudienceSnapshot {
    AudienceSnapshot {
        user_id: "user".to_string(),
        platform,
        observed_on,
        followers: 1_200,
        follower_growth: 0,
        age_groups: vec![Share::new("18-24", 20.0), Share::new(top_age, 45.0), Share::new("45+", 10.0)],
        genders: vec![Share::new("female", 55.0), Share::new("male", 45.0)],
        countries: vec![Share::new(country, 60.0), Share::new("Canada", 20.0)],
        active_times: vec![Share::new("Morning", 30.0), Share::new("Evening", 50.0)],
    }
}

#[test]
fn hashtags_need_two_posts_to_rank() {
    let posts = vec![
        tagged("a", Platform::Instagram, 100, &["summer"]),
        tagged("b", Platform::Instagram, 50, &["summer"]),
        tagged("c", Platform::Instagram, 40, &["sale"]),
    ];
    let synthesizer = InsightSynthesizer::new(InsightConfig::default());

    let tags = synthesizer.top_hashtags(&posts);

    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].tag, "summer");
    assert_eq!(tags[0].posts, 2);
    assert!((tags[0].average_engagement - 75.0).abs() < 1e-6);
    assert!(tags.iter().all(|tag| tag.tag != "sale"));
}

#[test]
fn a_tag_repeated_on_one_post_counts_once() {
    let posts = vec![
        tagged("a", Platform::Instagram, 30, &["launch", "#Launch", "launch"]),
        tagged("b", Platform::Facebook, 10, &["other"]),
    ];
    let synthesizer = InsightSynthesizer::new(InsightConfig::default());

    assert!(synthesizer.top_hashtags(&posts).is_empty());
}

#[test]
fn hashtags_are_normalized_and_limited() {
    let posts = vec![
        tagged("a", Platform::Instagram, 90, &["#Alpha", "beta", "gamma", "delta"]),
        tagged("b", Platform::Twitter, 30, &["alpha", "Beta", "gamma", "delta"]),
        tagged("c", Platform::Twitter, 60, &["beta", "gamma"]),
    ];
    let synthesizer = InsightSynthesizer::new(InsightConfig::default());

    let tags = synthesizer.top_hashtags(&posts);

    assert_eq!(tags.len(), 3);
    assert_eq!(tags[0].tag, "alpha");
    assert!((tags[0].average_engagement - 60.0).abs() < 1e-6);
    assert_eq!(tags[0].posts, 2);
    // All four average 60, so first-seen order decides.
    let names: Vec<&str> = tags.iter().map(|tag| tag.tag.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn best_platform_prefers_canonical_order_on_ties() {
    let posts = vec![
        tagged("a", Platform::Twitter, 80, &[]),
        tagged("b", Platform::Instagram, 80, &[]),
        tagged("c", Platform::Facebook, 20, &[]),
    ];

    let rows = platform_performance(&posts);
    let best = best_platform(&rows).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].platform, Platform::Instagram);
    assert_eq!(best.platform, Platform::Instagram);
    assert!((best.average_engagement - 80.0).abs() < 1e-6);
}

#[test]
fn best_platform_sentence_names_the_rounded_rate() {
    let posts = vec![
        tagged("a", Platform::Linkedin, 42, &[]),
        tagged("b", Platform::Linkedin, 40, &[]),
        tagged("c", Platform::Facebook, 12, &[]),
    ];
    let synthesizer = InsightSynthesizer::new(InsightConfig::default());

    let insights = synthesizer.synthesize(&posts, &[]);

    assert_eq!(insights.best_platform.unwrap().platform, Platform::Linkedin);
    assert!(insights.messages[0].contains("LinkedIn"));
    assert!(insights.messages[0].contains("41"));
}

#[test]
fn half_rates_round_up_in_the_best_platform_sentence() {
    let posts = vec![
        tagged("a", Platform::Twitter, 41, &[]),
        tagged("b", Platform::Twitter, 40, &[]),
    ];
    let synthesizer = InsightSynthesizer::new(InsightConfig::default());

    let insights = synthesizer.synthesize(&posts, &[]);

    assert!((insights.best_platform.unwrap().average_engagement - 40.5).abs() < 1e-6);
    assert!(insights.messages[0].contains("with 41 engagements"));
    assert_eq!(format_float(2.5, 0), "3");
    assert_eq!(format_float(0.125, 2), "0.13");
    assert_eq!(format_float(8.0, 2), "8.00");
}

#[test]
fn audience_uses_the_most_recent_snapshot() {
    let older = snapshot(
        Platform::Instagram,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        "35-44",
        "Germany",
    );
    let newer = snapshot(
        Platform::Instagram,
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        "25-34",
        "United States",
    );

    let summaries = latest_audience(&[older, newer.clone()]);

    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.top_age_group.as_ref().unwrap().label, "25-34");
    assert_eq!(summary.top_country.as_ref().unwrap().label, "United States");
    assert_eq!(summary.most_active_time.as_ref().unwrap().label, "Evening");

    let synthesizer = InsightSynthesizer::new(InsightConfig::default());
    let insights = synthesizer.synthesize(&[], &[newer]);
    assert_eq!(insights.messages.len(), 3);
    assert!(insights.messages[0].contains("25-34"));
    assert!(insights.messages[1].contains("United States"));
    assert!(insights.messages[2].contains("evening"));
}

#[test]
fn follower_growth_adds_a_sentence() {
    let mut growing = snapshot(
        Platform::Facebook,
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        "25-34",
        "Canada",
    );
    growing.follower_growth = 120;
    growing.countries.clear();
    let synthesizer = InsightSynthesizer::new(InsightConfig::default());

    let insights = synthesizer.synthesize(&[], &[growing]);

    assert!(insights.messages.iter().all(|message| !message.contains("concentrated")));
    assert!(insights.messages.iter().any(|message| message.contains("120")));
}

#[test]
fn missing_data_produces_no_insights() {
    let synthesizer = InsightSynthesizer::new(InsightConfig::default());

    let insights = synthesizer.synthesize(&[], &[]);

    assert!(insights.best_platform.is_none());
    assert!(insights.top_hashtags.is_empty());
    assert!(insights.audience.is_empty());
    assert!(insights.messages.is_empty());
}
