use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::SourceError;
use crate::model::{AudienceSnapshot, DateRange, Platform, Post};
use crate::source::{post_matches, AnalyticsEvent, AnalyticsSource, AuditSink};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub audience: Vec<AudienceSnapshot>,
}

/// JSON-file backed records plus a bounded audit log.
pub struct FileStore {
    path: PathBuf,
    audit_path: PathBuf,
    audit_limit: usize,
    data: RwLock<Dataset>,
    audit: Mutex<Vec<AnalyticsEvent>>,
}

impl FileStore {
    pub async fn from_config(config: &StorageConfig) -> Result<Self, String> {
        Self::load(
            config.data_path.clone(),
            config.audit_path.clone(),
            config.audit_limit,
        )
        .await
    }

    pub async fn load(path: PathBuf, audit_path: PathBuf, audit_limit: usize) -> Result<Self, String> {
        let data: Dataset = read_json_or_default(&path, "records").await?;
        let audit: Vec<AnalyticsEvent> = read_json_or_default(&audit_path, "audit log").await?;
        debug!(
            posts = data.posts.len(),
            snapshots = data.audience.len(),
            path = %path.display(),
            "file store loaded"
        );

        Ok(Self {
            path,
            audit_path,
            audit_limit,
            data: RwLock::new(data),
            audit: Mutex::new(audit),
        })
    }

    /// Swaps every record owned by `user_id` for the given ones.
    pub async fn replace_user_data(
        &self,
        user_id: &str,
        posts: Vec<Post>,
        audience: Vec<AudienceSnapshot>,
    ) -> Result<usize, String> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        next.posts.retain(|post| post.user_id != user_id);
        next.audience.retain(|snapshot| snapshot.user_id != user_id);
        let inserted = posts.len();
        next.posts.extend(posts);
        next.audience.extend(audience);
        write_json_atomic(&self.path, &next, "records").await?;
        *guard = next;
        Ok(inserted)
    }

    pub async fn audit_events(&self) -> Vec<AnalyticsEvent> {
        let guard = self.audit.lock().await;
        guard.clone()
    }
}

#[async_trait]
impl AnalyticsSource for FileStore {
    async fn fetch_posts(
        &self,
        user_id: &str,
        range: Option<&DateRange>,
        platform: Option<Platform>,
    ) -> Result<Vec<Post>, SourceError> {
        let guard = self.data.read().await;
        Ok(guard
            .posts
            .iter()
            .filter(|post| post_matches(post, user_id, range, platform))
            .cloned()
            .collect())
    }

    async fn fetch_audience_snapshots(
        &self,
        user_id: &str,
        platform: Option<Platform>,
    ) -> Result<Vec<AudienceSnapshot>, SourceError> {
        let guard = self.data.read().await;
        let mut snapshots: Vec<AudienceSnapshot> = guard
            .audience
            .iter()
            .filter(|snapshot| snapshot.user_id == user_id)
            .filter(|snapshot| platform.map_or(true, |p| p == snapshot.platform))
            .cloned()
            .collect();
        snapshots.sort_by(|a, b| b.observed_on.cmp(&a.observed_on));
        Ok(snapshots)
    }
}

#[async_trait]
impl AuditSink for FileStore {
    async fn record_analytics_event(&self, event: &AnalyticsEvent) -> Result<(), SourceError> {
        let mut guard = self.audit.lock().await;
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.push(event.clone());
        next.extend(guard.iter().cloned());
        next.truncate(self.audit_limit);
        write_json_atomic(&self.audit_path, &next, "audit log")
            .await
            .map_err(SourceError::Io)?;
        *guard = next;
        Ok(())
    }
}

async fn read_json_or_default<T>(path: &Path, what: &str) -> Result<T, String>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| format!("failed to read {}: {}", what, err))?;
    if data.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&data).map_err(|err| format!("failed to parse {}: {}", what, err))
}

async fn write_json_atomic<T>(path: &Path, value: &T, what: &str) -> Result<(), String>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize {}: {}", what, err))?;
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, payload)
        .await
        .map_err(|err| format!("failed to write {}: {}", what, err))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|err| format!("failed to finalize {}: {}", what, err))?;
    Ok(())
}

async fn ensure_dir(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| format!("failed to create data dir: {}", err))
}
