use chrono::{TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use engagement_engine::seed::{generate_sample_audience, generate_sample_posts};
use engagement_engine::store::FileStore;
use engagement_engine::{
    AnalyticsSource, DateRange, InsightConfig, Platform, RankingConfig, ReportAssembler,
    ReportRequest,
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "engagement-engine-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test]
async fn missing_files_load_as_an_empty_store() {
    let dir = scratch_dir("empty");
    let store = FileStore::load(dir.join("data.json"), dir.join("audit.json"), 10)
        .await
        .unwrap();

    let posts = store.fetch_posts("user", None, None).await.unwrap();

    assert!(posts.is_empty());
    assert!(store.audit_events().await.is_empty());
}

#[tokio::test]
async fn seeded_data_survives_a_reload_and_feeds_a_report() {
    let dir = scratch_dir("seeded");
    let data_path = dir.join("data.json");
    let audit_path = dir.join("audit.json");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let store = FileStore::load(data_path.clone(), audit_path.clone(), 10)
        .await
        .unwrap();
    let inserted = store
        .replace_user_data(
            "demo",
            generate_sample_posts("demo", now, 7),
            generate_sample_audience("demo", now, 7),
        )
        .await
        .unwrap();
    assert_eq!(inserted, 60);

    let reloaded = Arc::new(FileStore::load(data_path, audit_path, 10).await.unwrap());
    let posts = reloaded.fetch_posts("demo", None, None).await.unwrap();
    assert_eq!(posts.len(), 60);
    let snapshots = reloaded
        .fetch_audience_snapshots("demo", Some(Platform::Twitter))
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 1);

    let assembler = ReportAssembler::new(
        reloaded.clone(),
        reloaded.clone(),
        chrono_tz::Tz::UTC,
        RankingConfig::default(),
        InsightConfig::default(),
    );
    let range = DateRange::new(now - chrono::Duration::days(40), now).unwrap();
    let outcome = assembler
        .generate_report(&ReportRequest::new("demo", range, None))
        .await
        .unwrap();

    assert_eq!(outcome.report().unwrap().totals.posts, 60);
    let events = reloaded.audit_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, "demo");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn audit_log_keeps_the_newest_events_up_to_its_limit() {
    let dir = scratch_dir("audit");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let store = Arc::new(
        FileStore::load(dir.join("data.json"), dir.join("audit.json"), 2)
            .await
            .unwrap(),
    );
    store
        .replace_user_data("demo", generate_sample_posts("demo", now, 1), Vec::new())
        .await
        .unwrap();
    let assembler = ReportAssembler::new(
        store.clone(),
        store.clone(),
        chrono_tz::Tz::UTC,
        RankingConfig::default(),
        InsightConfig::default(),
    );

    for days in [10, 20, 31] {
        let range = DateRange::new(now - chrono::Duration::days(days), now).unwrap();
        assembler
            .generate_report(&ReportRequest::new("demo", range, None))
            .await
            .unwrap();
    }

    let events = store.audit_events().await;
    assert_eq!(events.len(), 2);
    assert!(events[0].summary.posts >= events[1].summary.posts);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn sample_generation_is_deterministic_per_seed() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let first = generate_sample_posts("demo", now, 3);
    let second = generate_sample_posts("demo", now, 3);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.platform, b.platform);
        assert_eq!(a.published_at, b.published_at);
        assert_eq!(a.engagement(), b.engagement());
    }
    assert!(first.iter().all(|post| post.published_at.unwrap() < now));
}

fn blocked_dir(name: &str) -> (PathBuf, PathBuf) {
    let dir = scratch_dir(name);
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    (dir, blocker)
}

#[tokio::test]
async fn failed_record_write_leaves_the_store_unchanged() {
    let (dir, blocker) = blocked_dir("blocked-data");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let store = FileStore::load(blocker.join("data.json"), dir.join("audit.json"), 10)
        .await
        .unwrap();

    let result = store
        .replace_user_data(
            "demo",
            generate_sample_posts("demo", now, 7),
            generate_sample_audience("demo", now, 7),
        )
        .await;

    assert!(result.is_err());
    assert!(store.fetch_posts("demo", None, None).await.unwrap().is_empty());
    assert!(store
        .fetch_audience_snapshots("demo", None)
        .await
        .unwrap()
        .is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn failed_audit_write_keeps_the_log_unchanged() {
    let (dir, blocker) = blocked_dir("blocked-audit");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let store = Arc::new(
        FileStore::load(dir.join("data.json"), blocker.join("audit.json"), 10)
            .await
            .unwrap(),
    );
    store
        .replace_user_data("demo", generate_sample_posts("demo", now, 2), Vec::new())
        .await
        .unwrap();
    let assembler = ReportAssembler::new(
        store.clone(),
        store.clone(),
        chrono_tz::Tz::UTC,
        RankingConfig::default(),
        InsightConfig::default(),
    );

    let range = DateRange::new(now - chrono::Duration::days(40), now).unwrap();
    let outcome = assembler
        .generate_report(&ReportRequest::new("demo", range, None))
        .await
        .unwrap();

    assert_eq!(outcome.report().unwrap().totals.posts, 60);
    assert!(store.audit_events().await.is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}
