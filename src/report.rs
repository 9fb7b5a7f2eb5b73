use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{bucket_by_content_type, bucket_by_platform_slot, bucket_by_slot, ContentTypePerformance};
use crate::config::EngineConfig;
use crate::error::ReportError;
use crate::insights::{
    platform_performance, AudienceSummary, HashtagPerformance, InsightConfig, InsightSynthesizer,
    PlatformPerformance,
};
use crate::model::{AudienceSnapshot, DateRange, Platform, Post};
use crate::rank::{PlatformRecommendation, Ranker, RankingConfig, TimeSlot};
use crate::source::{AnalyticsEvent, AnalyticsSource, AuditSink, ReportParameters, ReportSummary};
use crate::stable_hash64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub user_id: String,
    pub range: DateRange,
    pub platform: Option<Platform>,
}

impl ReportRequest {
    pub fn new(user_id: impl Into<String>, range: DateRange, platform: Option<Platform>) -> Self {
        Self {
            user_id: user_id.into(),
            range,
            platform,
        }
    }

    /// Stable key for callers that cache reports per (user, range, platform).
    pub fn cache_key(&self) -> String {
        let payload = format!(
            "{}|{}|{}|{}",
            self.user_id,
            self.range.start.to_rfc3339(),
            self.range.end.to_rfc3339(),
            self.platform.map(Platform::key).unwrap_or("all")
        );
        format!("report_{:x}", stable_hash64(&payload))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub posts: u32,
    pub total_engagement: u64,
    pub average_engagement_rate: f64,
    pub impressions: u64,
    pub reach: u64,
}

impl ReportTotals {
    pub fn from_posts(posts: &[Post]) -> Self {
        if posts.is_empty() {
            return Self::default();
        }
        let rate_sum: f64 = posts.iter().map(Post::engagement_rate).sum();
        Self {
            posts: posts.len() as u32,
            total_engagement: posts.iter().map(Post::engagement).sum(),
            average_engagement_rate: rate_sum / posts.len() as f64,
            impressions: posts.iter().map(|post| post.impressions).sum(),
            reach: posts.iter().map(|post| post.reach).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub user_id: String,
    pub range: DateRange,
    pub platform: Option<Platform>,
    pub generated_at: DateTime<Utc>,
    pub totals: ReportTotals,
    pub platforms: Vec<PlatformPerformance>,
    pub content_types: Vec<ContentTypePerformance>,
    pub best_posting_times: Vec<TimeSlot>,
    pub recommendations: Vec<PlatformRecommendation>,
    pub top_hashtags: Vec<HashtagPerformance>,
    pub audience: Vec<AudienceSummary>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoData {
    pub user_id: String,
    pub range: DateRange,
    pub platform: Option<Platform>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Ready(AnalyticsReport),
    NoData(NoData),
}

impl ReportOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, ReportOutcome::NoData(_))
    }

    pub fn report(&self) -> Option<&AnalyticsReport> {
        match self {
            ReportOutcome::Ready(report) => Some(report),
            ReportOutcome::NoData(_) => None,
        }
    }
}

pub struct ReportAssembler {
    source: Arc<dyn AnalyticsSource>,
    audit: Arc<dyn AuditSink>,
    timezone: Tz,
    ranker: Ranker,
    synthesizer: InsightSynthesizer,
}

impl ReportAssembler {
    pub fn new(
        source: Arc<dyn AnalyticsSource>,
        audit: Arc<dyn AuditSink>,
        timezone: Tz,
        ranking: RankingConfig,
        insights: InsightConfig,
    ) -> Self {
        Self {
            source,
            audit,
            timezone,
            ranker: Ranker::new(ranking),
            synthesizer: InsightSynthesizer::new(insights),
        }
    }

    pub fn from_config(
        source: Arc<dyn AnalyticsSource>,
        audit: Arc<dyn AuditSink>,
        config: &EngineConfig,
    ) -> Result<Self, String> {
        Ok(Self::new(
            source,
            audit,
            config.analysis.timezone()?,
            config.ranking.clone(),
            config.insights.clone(),
        ))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id, platform = ?request.platform))]
    pub async fn generate_report(&self, request: &ReportRequest) -> Result<ReportOutcome, ReportError> {
        let fetched = self
            .source
            .fetch_posts(&request.user_id, Some(&request.range), request.platform)
            .await?;
        let fetched_count = fetched.len();
        let posts: Vec<Post> = fetched
            .into_iter()
            .filter(|post| {
                in_scope(post, &request.user_id, Some(&request.range), request.platform)
            })
            .collect();
        debug!(fetched = fetched_count, in_scope = posts.len(), "posts retrieved");

        if posts.is_empty() {
            info!("no published posts for requested range");
            return Ok(ReportOutcome::NoData(NoData {
                user_id: request.user_id.clone(),
                range: request.range,
                platform: request.platform,
                message: "No published posts in this range. Seed sample data or widen the date range."
                    .to_string(),
            }));
        }

        let snapshots: Vec<AudienceSnapshot> = self
            .source
            .fetch_audience_snapshots(&request.user_id, request.platform)
            .await?
            .into_iter()
            .filter(|snapshot| {
                snapshot.user_id == request.user_id
                    && request.platform.map_or(true, |p| p == snapshot.platform)
            })
            .collect();

        let report = self.assemble(request, &posts, &snapshots, Utc::now());
        self.record(&report).await;
        info!(
            posts = report.totals.posts,
            engagement = report.totals.total_engagement,
            "report generated"
        );
        Ok(ReportOutcome::Ready(report))
    }

    /// Ranked posting times over the user's whole history; platforms without
    /// history get the generic schedule.
    #[instrument(skip(self))]
    pub async fn recommend(
        &self,
        user_id: &str,
        platform: Option<Platform>,
    ) -> Result<Vec<PlatformRecommendation>, ReportError> {
        let posts = self.source.fetch_posts(user_id, None, platform).await?;
        let posts: Vec<Post> = posts
            .into_iter()
            .filter(|post| in_scope(post, user_id, None, platform))
            .collect();
        let buckets = bucket_by_platform_slot(&posts, self.timezone);
        Ok(self.ranker.recommend(&buckets, platform))
    }

    /// Pure assembly from already retrieved records.
    pub fn assemble(
        &self,
        request: &ReportRequest,
        posts: &[Post],
        snapshots: &[AudienceSnapshot],
        generated_at: DateTime<Utc>,
    ) -> AnalyticsReport {
        let platform_buckets = bucket_by_platform_slot(posts, self.timezone);
        let slot_buckets = bucket_by_slot(posts, self.timezone);
        let insights = self.synthesizer.synthesize(posts, snapshots);

        AnalyticsReport {
            user_id: request.user_id.clone(),
            range: request.range,
            platform: request.platform,
            generated_at,
            totals: ReportTotals::from_posts(posts),
            platforms: platform_performance(posts),
            content_types: bucket_by_content_type(posts),
            best_posting_times: self.ranker.rank_flat(&slot_buckets),
            recommendations: self.ranker.recommend(&platform_buckets, request.platform),
            top_hashtags: insights.top_hashtags,
            audience: insights.audience,
            insights: insights.messages,
        }
    }

    async fn record(&self, report: &AnalyticsReport) {
        let event = AnalyticsEvent {
            user_id: report.user_id.clone(),
            recorded_at: report.generated_at,
            parameters: ReportParameters {
                range: report.range,
                platform: report.platform,
            },
            summary: ReportSummary {
                posts: report.totals.posts,
                total_engagement: report.totals.total_engagement,
                average_engagement_rate: report.totals.average_engagement_rate,
            },
        };
        if let Err(err) = self.audit.record_analytics_event(&event).await {
            warn!(error = %err, "failed to record analytics event");
        }
    }
}

/// Published posts owned by `user_id`, optionally narrowed to a range and a
/// platform.
fn in_scope(post: &Post, user_id: &str, range: Option<&DateRange>, platform: Option<Platform>) -> bool {
    let Some(published) = post.published_time() else {
        return false;
    };
    post.user_id == user_id
        && platform.map_or(true, |p| p == post.platform)
        && range.map_or(true, |range| range.contains(published))
}
