//! Column-oriented batches: one JSON array per field, all of equal length.

use super::record::{
    activity_value, entity_id_value, product_value, timestamp_value, ACTIVITY_TYPE, PRODUCT_ID,
    TIMESTAMP,
};
use super::Event;
use crate::error::{FeatureStoreError, Result};
use serde_json::{Map, Value};

/// Parse `{"<entity_key>": [...], "activity_type": [...], "timestamp": [...], "product_id": [...]}`.
pub fn parse_columns(batch: &Value, entity_key: &str) -> Result<Vec<Event>> {
    let obj = batch.as_object().ok_or_else(|| {
        FeatureStoreError::InvalidInput("column batch must be a JSON object".to_string())
    })?;

    let ids = column(obj, entity_key)?;
    let activities = column(obj, ACTIVITY_TYPE)?;
    let timestamps = column(obj, TIMESTAMP)?;
    let products = column(obj, PRODUCT_ID)?;

    let n = ids.len();
    if [activities.len(), timestamps.len(), products.len()].iter().any(|&l| l != n) {
        return Err(FeatureStoreError::InvalidInput(
            "all columns must have the same length".to_string(),
        ));
    }

    (0..n)
        .map(|i| {
            Ok(Event {
                entity_id: entity_id_value(&ids[i], entity_key, i)?,
                activity_type: activity_value(&activities[i], i)?,
                timestamp: timestamp_value(&timestamps[i], i)?,
                product_id: product_value(&products[i], i)?,
            })
        })
        .collect()
}

fn column<'a>(obj: &'a Map<String, Value>, name: &str) -> Result<&'a Vec<Value>> {
    obj.get(name)
        .ok_or_else(|| FeatureStoreError::Schema(format!("missing required column '{}'", name)))?
        .as_array()
        .ok_or_else(|| FeatureStoreError::InvalidInput(format!("column '{}' must be an array", name)))
}
