use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::insights::InsightConfig;
use crate::rank::RankingConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// IANA zone used to derive day-of-week and hour-of-day.
    pub timezone: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn timezone(&self) -> Result<Tz, String> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|err| format!("invalid timezone {}: {}", self.timezone, err))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_path: PathBuf,
    pub audit_path: PathBuf,
    pub audit_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/analytics.json"),
            audit_path: PathBuf::from("data/audit.json"),
            audit_limit: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// When set, records are read from this REST backend instead of the file store.
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: 5000,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub analysis: AnalysisConfig,
    pub ranking: RankingConfig,
    pub insights: InsightConfig,
    pub storage: StorageConfig,
    pub backend: BackendConfig,
}

impl EngineConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                Self::parse(&contents)?
            } else {
                EngineConfig::default()
            }
        } else {
            EngineConfig::default()
        };

        config.apply_env_overrides();
        config.analysis.timezone()?;
        Ok((config, config_path))
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|err| format!("failed to parse config: {}", err))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload)
            .map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(timezone) = env::var("ANALYTICS_TIMEZONE") {
            if !timezone.trim().is_empty() {
                self.analysis.timezone = timezone;
            }
        }
        if let Ok(path) = env::var("ANALYTICS_DATA_PATH") {
            if !path.trim().is_empty() {
                self.storage.data_path = PathBuf::from(path);
            }
        }
        if let Ok(path) = env::var("ANALYTICS_AUDIT_PATH") {
            if !path.trim().is_empty() {
                self.storage.audit_path = PathBuf::from(path);
            }
        }
        if let Ok(endpoint) = env::var("ANALYTICS_BACKEND_URL") {
            if !endpoint.trim().is_empty() {
                self.backend.endpoint = Some(endpoint);
            }
        }
        if let Ok(timeout) = env::var("ANALYTICS_BACKEND_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.backend.timeout_ms = value;
            }
        }
        if let Ok(key) = env::var("ANALYTICS_BACKEND_KEY") {
            if !key.trim().is_empty() {
                self.backend.api_key = Some(key);
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ENGINE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/engine.toml")))
}
