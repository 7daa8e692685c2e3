//! Per-entity aggregate features computed from an activity event batch.

mod activity;
mod history;
mod pipeline;

pub use activity::ActivityStats;
pub use history::{FeatureHistory, Snapshot};
pub use pipeline::{aggregate, purchase_counts, total_activities, unique_products_viewed};

use crate::events::{EntityId, EntityKeyKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Columns of the feature table. Every feature is an `int64` count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    TotalActivities,
    UniqueProductsViewed,
    PurchaseCount,
}

impl FeatureName {
    pub const ALL: [FeatureName; 3] = [
        FeatureName::TotalActivities,
        FeatureName::UniqueProductsViewed,
        FeatureName::PurchaseCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::TotalActivities => "total_activities",
            FeatureName::UniqueProductsViewed => "unique_products_viewed",
            FeatureName::PurchaseCount => "purchase_count",
        }
    }
}

impl FromStr for FeatureName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureName::ALL.into_iter().find(|f| f.as_str() == s).ok_or(())
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregates for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub entity_id: EntityId,
    pub total_activities: u64,
    pub unique_products_viewed: u64,
    pub purchase_count: u64,
}

impl FeatureRow {
    pub fn get(&self, feature: FeatureName) -> u64 {
        match feature {
            FeatureName::TotalActivities => self.total_activities,
            FeatureName::UniqueProductsViewed => self.unique_products_viewed,
            FeatureName::PurchaseCount => self.purchase_count,
        }
    }
}

/// Everything the table knows about one entity.
#[derive(Debug, Clone)]
pub struct EntityFeatures {
    /// Aggregates over all of the entity's events
    pub row: FeatureRow,
    /// Latest event timestamp seen for the entity
    pub as_of: i64,
    /// Cumulative snapshots, one per distinct event timestamp
    pub history: FeatureHistory,
}

/// Materialized feature table, keyed by entity and iterated in ascending key order.
///
/// Immutable once built; share it between readers with `Arc`.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    entities: BTreeMap<EntityId, EntityFeatures>,
    key_kind: EntityKeyKind,
    materialization_id: Uuid,
    materialized_at: DateTime<Utc>,
}

impl FeatureTable {
    pub(crate) fn new(entities: BTreeMap<EntityId, EntityFeatures>, key_kind: EntityKeyKind) -> Self {
        Self {
            entities,
            key_kind,
            materialization_id: Uuid::new_v4(),
            materialized_at: Utc::now(),
        }
    }

    pub fn get(&self, entity_id: &EntityId) -> Option<&FeatureRow> {
        self.entities.get(entity_id).map(|e| &e.row)
    }

    pub fn entity(&self, entity_id: &EntityId) -> Option<&EntityFeatures> {
        self.entities.get(entity_id)
    }

    pub fn as_of(&self, entity_id: &EntityId) -> Option<i64> {
        self.entities.get(entity_id).map(|e| e.as_of)
    }

    pub fn rows(&self) -> impl Iterator<Item = &FeatureRow> {
        self.entities.values().map(|e| &e.row)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.keys()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn key_kind(&self) -> EntityKeyKind {
        self.key_kind
    }

    pub fn columns(&self) -> &'static [FeatureName] {
        &FeatureName::ALL
    }

    pub fn materialization_id(&self) -> Uuid {
        self.materialization_id
    }

    pub fn materialized_at(&self) -> DateTime<Utc> {
        self.materialized_at
    }
}
