use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::SourceError;
use crate::model::{AudienceSnapshot, DateRange, Platform, Post};
use crate::source::{AnalyticsEvent, AnalyticsSource, AuditSink};

/// Records served by the hosted backend's REST API.
#[derive(Clone)]
pub struct RestSource {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl RestSource {
    pub fn from_config(config: &BackendConfig) -> Result<Self, String> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| "backend endpoint is not configured".to_string())?;
        let timeout = Duration::from_millis(config.timeout_ms);
        RestSource::new(endpoint, config.api_key.clone(), timeout)
    }

    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| format!("failed to build backend client: {}", err))?;
        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }

    fn user_url(&self, user_id: &str, resource: &str) -> String {
        format!(
            "{}/users/{}/{}",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(user_id),
            resource
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key.as_ref() {
            Some(key) => request.header(AUTHORIZATION, format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: Vec<(&'static str, String)>,
    ) -> Result<T, SourceError> {
        debug!(url = %url, "backend request");
        let response = self
            .authorize(self.client.get(url).query(&query))
            .send()
            .await
            .map_err(|err| SourceError::Http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| SourceError::Parse(err.to_string()))
    }
}

#[async_trait]
impl AnalyticsSource for RestSource {
    async fn fetch_posts(
        &self,
        user_id: &str,
        range: Option<&DateRange>,
        platform: Option<Platform>,
    ) -> Result<Vec<Post>, SourceError> {
        let mut query = Vec::new();
        if let Some(range) = range {
            query.push(("start", range.start.to_rfc3339()));
            query.push(("end", range.end.to_rfc3339()));
        }
        if let Some(platform) = platform {
            query.push(("platform", platform.key().to_string()));
        }
        self.get_json(self.user_url(user_id, "posts"), query).await
    }

    async fn fetch_audience_snapshots(
        &self,
        user_id: &str,
        platform: Option<Platform>,
    ) -> Result<Vec<AudienceSnapshot>, SourceError> {
        let mut query = vec![("order", "observed_on.desc".to_string())];
        if let Some(platform) = platform {
            query.push(("platform", platform.key().to_string()));
        }
        self.get_json(self.user_url(user_id, "audience"), query).await
    }
}

#[async_trait]
impl AuditSink for RestSource {
    async fn record_analytics_event(&self, event: &AnalyticsEvent) -> Result<(), SourceError> {
        let url = self.user_url(&event.user_id, "analytics-events");
        let response = self
            .authorize(self.client.post(url).json(event))
            .send()
            .await
            .map_err(|err| SourceError::Http(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(())
    }
}
