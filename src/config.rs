//! Feature store configuration, loaded from a JSON file.

use crate::error::Result;
use crate::features::FeatureName;
use crate::store::{define_feature_view, FeatureViewSpec, USER_ACTIVITY_VIEW, USER_ENTITY_KEY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Feature repository path, reported by the initialized store
    pub repo_path: PathBuf,
    /// Feature view served by the store
    pub feature_view: FeatureViewConfig,
    /// JSON file of event records; the built-in sample batch is used when unset
    pub events_path: Option<PathBuf>,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureViewConfig {
    pub name: String,
    /// Identifier field of event records and output rows
    pub entity_key: String,
    pub features: Vec<String>,
    /// Metadata only; retrieval never filters on it
    pub ttl_secs: u64,
    pub description: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            feature_view: FeatureViewConfig::default(),
            events_path: None,
            log: LogConfig::default(),
        }
    }
}

impl Default for FeatureViewConfig {
    fn default() -> Self {
        Self {
            name: USER_ACTIVITY_VIEW.to_string(),
            entity_key: USER_ENTITY_KEY.to_string(),
            features: FeatureName::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            ttl_secs: 24 * 60 * 60,
            description: Some("User activity aggregated features for ML models".to_string()),
            source: Some("push_source".to_string()),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl StoreConfig {
    /// Load from JSON file if present; default when the file does not exist.
    /// Unreadable or invalid files are errors.
    pub fn try_load(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str::<StoreConfig>(&data)?)
    }

    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &Path) -> Self {
        Self::try_load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "invalid config; using defaults");
            Self::default()
        })
    }

    pub fn feature_view_spec(&self) -> Result<FeatureViewSpec> {
        let fv = &self.feature_view;
        let mut view = define_feature_view(
            &fv.name,
            fv.features.as_slice(),
            &fv.entity_key,
            Duration::from_secs(fv.ttl_secs),
        )?;
        view.description = fv.description.clone();
        view.source = fv.source.clone();
        Ok(view)
    }
}
