pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod error;
pub mod fallback;
pub mod insights;
pub mod model;
pub mod rank;
pub mod report;
pub mod rest_client;
pub mod seed;
pub mod source;
pub mod store;

pub use aggregate::{bucket_by_content_type, bucket_by_platform_slot, bucket_by_slot, ContentTypePerformance, TimeBucket};
pub use config::EngineConfig;
pub use error::{ReportError, SourceError};
pub use insights::{InsightConfig, InsightSynthesizer, Insights};
pub use model::{AudienceSnapshot, DateRange, DayOfWeek, Platform, Post, PostStatus, Share};
pub use rank::{DayRecommendation, PlatformRecommendation, Ranker, RankingConfig, RecommendationSource, TimeSlot};
pub use report::{AnalyticsReport, NoData, ReportAssembler, ReportOutcome, ReportRequest, ReportTotals};
pub use source::{AnalyticsEvent, AnalyticsSource, AuditSink};

pub(crate) fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

/// Halves round away from zero, so 40.5 prints as 41.
pub fn format_float(value: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    format!("{:.1$}", (value * scale).round() / scale, digits)
}
