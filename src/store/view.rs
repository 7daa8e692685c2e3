//! Feature view metadata: which features are served together, for which entity.

use crate::error::{FeatureStoreError, Result};
use crate::features::FeatureName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

pub const USER_ACTIVITY_VIEW: &str = "user_activity_features";
pub const USER_ENTITY_KEY: &str = "user_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureDtype {
    Int64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureField {
    pub name: String,
    pub dtype: FeatureDtype,
}

/// Declarative view description. TTL and source are carried as metadata only
/// and never filter retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureViewSpec {
    pub name: String,
    pub entity_key: String,
    pub features: Vec<FeatureField>,
    pub ttl: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Validate and build a feature view. `feature_names` must be non-empty and unique.
pub fn define_feature_view<S: AsRef<str>>(
    name: &str,
    feature_names: &[S],
    entity_key: &str,
    ttl: Duration,
) -> Result<FeatureViewSpec> {
    if name.trim().is_empty() {
        return Err(FeatureStoreError::InvalidInput(
            "feature view name must not be empty".to_string(),
        ));
    }
    if entity_key.trim().is_empty() {
        return Err(FeatureStoreError::InvalidInput(format!(
            "feature view '{}': entity key must not be empty",
            name
        )));
    }
    if feature_names.is_empty() {
        return Err(FeatureStoreError::InvalidInput(format!(
            "feature view '{}': feature_names must not be empty",
            name
        )));
    }

    let mut seen = HashSet::new();
    let mut features = Vec::with_capacity(feature_names.len());
    for f in feature_names {
        let f = f.as_ref();
        if !seen.insert(f) {
            return Err(FeatureStoreError::InvalidInput(format!(
                "feature view '{}': duplicate feature '{}'",
                name, f
            )));
        }
        features.push(FeatureField {
            name: f.to_string(),
            dtype: FeatureDtype::Int64,
        });
    }

    Ok(FeatureViewSpec {
        name: name.to_string(),
        entity_key: entity_key.to_string(),
        features,
        ttl,
        description: None,
        source: None,
    })
}

impl FeatureViewSpec {
    /// The user activity view: all three aggregates keyed by `user_id`, one day TTL.
    pub fn user_activity() -> Self {
        FeatureViewSpec {
            name: USER_ACTIVITY_VIEW.to_string(),
            entity_key: USER_ENTITY_KEY.to_string(),
            features: FeatureName::ALL
                .iter()
                .map(|f| FeatureField {
                    name: f.as_str().to_string(),
                    dtype: FeatureDtype::Int64,
                })
                .collect(),
            ttl: Duration::from_secs(24 * 60 * 60),
            description: Some("User activity aggregated features for ML models".to_string()),
            source: Some("push_source".to_string()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }
}
