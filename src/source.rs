use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::model::{AudienceSnapshot, DateRange, Platform, Post};

/// Read side of the persistence layer. An empty result is not an error.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch_posts(
        &self,
        user_id: &str,
        range: Option<&DateRange>,
        platform: Option<Platform>,
    ) -> Result<Vec<Post>, SourceError>;

    /// Expected most recent first.
    async fn fetch_audience_snapshots(
        &self,
        user_id: &str,
        platform: Option<Platform>,
    ) -> Result<Vec<AudienceSnapshot>, SourceError>;
}

/// Best-effort audit trail for generated reports.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record_analytics_event(&self, event: &AnalyticsEvent) -> Result<(), SourceError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportParameters {
    pub range: DateRange,
    pub platform: Option<Platform>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub posts: u32,
    pub total_engagement: u64,
    pub average_engagement_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub user_id: String,
    pub recorded_at: DateTime<Utc>,
    pub parameters: ReportParameters,
    pub summary: ReportSummary,
}

/// Matches a post against the usual retrieval filters.
pub fn post_matches(
    post: &Post,
    user_id: &str,
    range: Option<&DateRange>,
    platform: Option<Platform>,
) -> bool {
    if post.user_id != user_id {
        return false;
    }
    if let Some(platform) = platform {
        if post.platform != platform {
            return false;
        }
    }
    match range {
        Some(range) => post
            .published_at
            .map(|published| range.contains(published))
            .unwrap_or(false),
        None => true,
    }
}
