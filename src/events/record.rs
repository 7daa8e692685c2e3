//! Parse events from JSON records (`{"user_id": 1, "activity_type": "view", ...}`).

use super::{ActivityType, EntityId, Event};
use crate::error::{FeatureStoreError, Result};
use serde_json::{Map, Value};

pub(super) const ACTIVITY_TYPE: &str = "activity_type";
pub(super) const TIMESTAMP: &str = "timestamp";
pub(super) const PRODUCT_ID: &str = "product_id";

/// Parse a list of records; the first malformed record aborts the batch.
pub fn parse_records(records: &[Value], entity_key: &str) -> Result<Vec<Event>> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| Event::from_indexed_record(r, entity_key, i))
        .collect()
}

impl Event {
    /// Parse a single record. `entity_key` names the identifier field.
    pub fn from_record(record: &Value, entity_key: &str) -> Result<Self> {
        Self::from_indexed_record(record, entity_key, 0)
    }

    fn from_indexed_record(record: &Value, entity_key: &str, index: usize) -> Result<Self> {
        let obj = record.as_object().ok_or_else(|| {
            FeatureStoreError::InvalidInput(format!("record {} is not a JSON object", index))
        })?;

        Ok(Event {
            entity_id: entity_id_value(required(obj, entity_key, index)?, entity_key, index)?,
            activity_type: activity_value(required(obj, ACTIVITY_TYPE, index)?, index)?,
            timestamp: timestamp_value(required(obj, TIMESTAMP, index)?, index)?,
            product_id: product_value(obj.get(PRODUCT_ID).unwrap_or(&Value::Null), index)?,
        })
    }
}

fn required<'a>(obj: &'a Map<String, Value>, name: &str, index: usize) -> Result<&'a Value> {
    obj.get(name).ok_or_else(|| {
        FeatureStoreError::Schema(format!("record {} is missing required field '{}'", index, name))
    })
}

pub(super) fn entity_id_value(v: &Value, field: &str, index: usize) -> Result<EntityId> {
    match v {
        Value::Number(n) => n.as_i64().map(EntityId::Int).ok_or_else(|| {
            FeatureStoreError::InvalidInput(format!(
                "record {}: '{}' must be an integer or string, got {}",
                index, field, n
            ))
        }),
        Value::String(s) => Ok(EntityId::Str(s.clone())),
        other => Err(FeatureStoreError::InvalidInput(format!(
            "record {}: '{}' must be an integer or string, got {}",
            index, field, other
        ))),
    }
}

pub(super) fn activity_value(v: &Value, index: usize) -> Result<ActivityType> {
    v.as_str().map(ActivityType::parse).ok_or_else(|| {
        FeatureStoreError::InvalidInput(format!(
            "record {}: '{}' must be a string, got {}",
            index, ACTIVITY_TYPE, v
        ))
    })
}

pub(super) fn timestamp_value(v: &Value, index: usize) -> Result<i64> {
    let ts = v.as_i64().ok_or_else(|| {
        FeatureStoreError::InvalidInput(format!(
            "record {}: '{}' must be integer epoch seconds, got {}",
            index, TIMESTAMP, v
        ))
    })?;
    if ts < 0 {
        return Err(FeatureStoreError::InvalidInput(format!(
            "record {}: '{}' must be non-negative, got {}",
            index, TIMESTAMP, ts
        )));
    }
    Ok(ts)
}

pub(super) fn product_value(v: &Value, index: usize) -> Result<Option<String>> {
    match v {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(FeatureStoreError::InvalidInput(format!(
            "record {}: '{}' must be a string or null, got {}",
            index, PRODUCT_ID, other
        ))),
    }
}
