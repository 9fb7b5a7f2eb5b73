use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use engagement_engine::calendar::ScheduledSlot;
use engagement_engine::{DateRange, Platform, PlatformRecommendation, ReportRequest};

const DEFAULT_RANGE_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct ApiReportRequest {
    pub user_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub days: Option<i64>,
    pub platform: Option<String>,
}

impl ApiReportRequest {
    pub fn into_request(self, now: DateTime<Utc>) -> Result<ReportRequest, String> {
        let user_id = required_user(self.user_id)?;
        let end = self.end.unwrap_or(now);
        let range = match self.start {
            Some(start) => DateRange::new(start, end)?,
            None => DateRange::trailing_days(end, self.days.unwrap_or(DEFAULT_RANGE_DAYS))?,
        };
        let platform = parse_platform(self.platform.as_deref())?;
        Ok(ReportRequest::new(user_id, range, platform))
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiRecommendationQuery {
    pub user_id: Option<String>,
    pub platform: Option<String>,
    pub upcoming: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ApiRecommendationResponse {
    pub recommendations: Vec<PlatformRecommendation>,
    pub upcoming: Vec<ScheduledSlot>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSeedRequest {
    pub user_id: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ApiSeedResponse {
    pub user_id: String,
    pub posts: usize,
}

pub fn required_user(value: Option<String>) -> Result<String, String> {
    let user_id = value.unwrap_or_default().trim().to_string();
    if user_id.is_empty() {
        return Err("user_id is required".to_string());
    }
    Ok(user_id)
}

pub fn parse_platform(value: Option<&str>) -> Result<Option<Platform>, String> {
    match value.map(str::trim).filter(|value| !value.is_empty() && *value != "all") {
        Some(value) => Platform::from_str(value)
            .map(Some)
            .ok_or_else(|| format!("invalid platform: {}", value)),
        None => Ok(None),
    }
}
