//! Historical (training) and online (serving) reads over a bound feature table.

use super::FeatureViewSpec;
use crate::error::{FeatureStoreError, Result};
use crate::events::EntityId;
use crate::features::{FeatureName, FeatureRow, FeatureTable};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Training-path query: features for `entity_id` as of `event_timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRef {
    pub entity_id: EntityId,
    pub event_timestamp: i64,
}

impl HistoricalRef {
    pub fn new(entity_id: impl Into<EntityId>, event_timestamp: i64) -> Self {
        Self {
            entity_id: entity_id.into(),
            event_timestamp,
        }
    }
}

/// Serving-path query: latest features for `entity_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_id: EntityId,
}

impl EntityRef {
    pub fn new(entity_id: impl Into<EntityId>) -> Self {
        Self {
            entity_id: entity_id.into(),
        }
    }
}

/// One projected feature; `None` when the entity has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureValue {
    pub name: FeatureName,
    pub value: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRow {
    pub entity_id: EntityId,
    pub event_timestamp: i64,
    /// `valid_from` of the snapshot the values came from
    pub feature_timestamp: Option<i64>,
    pub features: Vec<FeatureValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineRow {
    pub entity_id: EntityId,
    pub features: Vec<FeatureValue>,
}

/// Training frame: one row per query, in query order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalFrame {
    pub features: Vec<FeatureName>,
    pub rows: Vec<HistoricalRow>,
}

impl HistoricalRow {
    pub fn get(&self, feature: FeatureName) -> Option<u64> {
        lookup(&self.features, feature)
    }

    pub fn is_missing(&self) -> bool {
        self.features.iter().all(|f| f.value.is_none())
    }

    /// Flat record: entity key, `event_timestamp`, then one column per feature.
    pub fn to_record(&self, entity_key: &str) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert(entity_key.to_string(), entity_value(&self.entity_id));
        out.insert("event_timestamp".to_string(), Value::from(self.event_timestamp));
        insert_features(&mut out, &self.features);
        out
    }
}

impl OnlineRow {
    pub fn get(&self, feature: FeatureName) -> Option<u64> {
        lookup(&self.features, feature)
    }

    pub fn is_missing(&self) -> bool {
        self.features.iter().all(|f| f.value.is_none())
    }

    /// Flat record: entity key, then one column per feature.
    pub fn to_record(&self, entity_key: &str) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert(entity_key.to_string(), entity_value(&self.entity_id));
        insert_features(&mut out, &self.features);
        out
    }
}

impl HistoricalFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoricalRow> {
        self.rows.iter()
    }

    /// Feature matrix (rows × projected features) with `NaN` for missing values.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), self.features.len()), |(r, c)| {
            self.rows[r].features[c].value.map_or(f64::NAN, |v| v as f64)
        })
    }
}

fn lookup(features: &[FeatureValue], feature: FeatureName) -> Option<u64> {
    features.iter().find(|f| f.name == feature).and_then(|f| f.value)
}

fn entity_value(id: &EntityId) -> Value {
    match id {
        EntityId::Int(i) => Value::from(*i),
        EntityId::Str(s) => Value::from(s.as_str()),
    }
}

fn insert_features(out: &mut Map<String, Value>, features: &[FeatureValue]) {
    for f in features {
        out.insert(
            f.name.as_str().to_string(),
            f.value.map_or(Value::Null, Value::from),
        );
    }
}

/// Ready-state contents: the bound table, its view, and the resolved projection.
#[derive(Debug, Clone)]
pub(super) struct ReadyStore {
    pub(super) table: Arc<FeatureTable>,
    pub(super) view: FeatureViewSpec,
    pub(super) projection: Vec<FeatureName>,
}

impl ReadyStore {
    pub(super) fn bind(table: Arc<FeatureTable>, view: FeatureViewSpec) -> Result<Self> {
        let projection = view
            .feature_names()
            .map(|name| {
                name.parse::<FeatureName>().map_err(|_| {
                    FeatureStoreError::Schema(format!(
                        "feature view '{}' requests unknown feature '{}'; table columns are {}",
                        view.name,
                        name,
                        table
                            .columns()
                            .iter()
                            .map(|c| c.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            table,
            view,
            projection,
        })
    }

    fn check_key(&self, entity_id: &EntityId, index: usize) -> Result<()> {
        let expected = self.table.key_kind();
        if entity_id.kind() != expected {
            return Err(FeatureStoreError::Schema(format!(
                "query {}: entity_id '{}' is a {} key but table '{}' is keyed by {} ids",
                index,
                entity_id,
                entity_id.kind(),
                self.view.name,
                expected
            )));
        }
        Ok(())
    }

    fn project(&self, row: Option<&FeatureRow>) -> Vec<FeatureValue> {
        self.projection
            .iter()
            .map(|&name| FeatureValue {
                name,
                value: row.map(|r| r.get(name)),
            })
            .collect()
    }

    pub(super) fn historical(&self, refs: &[HistoricalRef]) -> Result<HistoricalFrame> {
        for (i, r) in refs.iter().enumerate() {
            if r.event_timestamp < 0 {
                return Err(FeatureStoreError::InvalidInput(format!(
                    "query {}: event_timestamp must be non-negative, got {}",
                    i, r.event_timestamp
                )));
            }
            self.check_key(&r.entity_id, i)?;
        }

        let rows = refs
            .iter()
            .map(|r| {
                let snapshot = match self.table.entity(&r.entity_id) {
                    Some(entity) => {
                        let s = entity.history.as_of(r.event_timestamp);
                        if s.is_none() {
                            debug!(
                                entity_id = %r.entity_id,
                                event_timestamp = r.event_timestamp,
                                "query precedes first event; returning missing values"
                            );
                        }
                        s
                    }
                    None => {
                        warn!(entity_id = %r.entity_id, "entity not in feature table; returning missing values");
                        None
                    }
                };
                HistoricalRow {
                    entity_id: r.entity_id.clone(),
                    event_timestamp: r.event_timestamp,
                    feature_timestamp: snapshot.map(|s| s.valid_from),
                    features: self.project(snapshot.map(|s| &s.row)),
                }
            })
            .collect();

        debug!(queries = refs.len(), view = %self.view.name, "historical retrieval");
        Ok(HistoricalFrame {
            features: self.projection.clone(),
            rows,
        })
    }

    pub(super) fn online(&self, refs: &[EntityRef]) -> Result<Vec<OnlineRow>> {
        for (i, r) in refs.iter().enumerate() {
            self.check_key(&r.entity_id, i)?;
        }

        let rows = refs
            .iter()
            .map(|r| {
                let row = self.table.get(&r.entity_id);
                if row.is_none() {
                    warn!(entity_id = %r.entity_id, "entity not in feature table; returning missing values");
                }
                OnlineRow {
                    entity_id: r.entity_id.clone(),
                    features: self.project(row),
                }
            })
            .collect();

        debug!(queries = refs.len(), view = %self.view.name, "online retrieval");
        Ok(rows)
    }
}
