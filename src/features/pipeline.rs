//! Aggregation pipeline: events → partitions by entity → activity stats → feature table.

use super::{ActivityStats, EntityFeatures, FeatureHistory, FeatureTable};
use crate::error::{FeatureStoreError, Result};
use crate::events::{EntityId, Event};
use std::collections::BTreeMap;
use tracing::debug;

/// Build the feature table for a batch of events.
///
/// Entities are emitted in ascending key order. Fails on an empty batch, a
/// negative timestamp, or a batch mixing integer and string entity ids.
pub fn aggregate(events: &[Event]) -> Result<FeatureTable> {
    let first = events
        .first()
        .ok_or_else(|| FeatureStoreError::InvalidInput("event batch is empty".to_string()))?;
    let key_kind = first.entity_id.kind();

    let mut partitions: BTreeMap<&EntityId, Vec<&Event>> = BTreeMap::new();
    for (i, e) in events.iter().enumerate() {
        if e.timestamp < 0 {
            return Err(FeatureStoreError::InvalidInput(format!(
                "event {}: timestamp must be non-negative, got {}",
                i, e.timestamp
            )));
        }
        if e.entity_id.kind() != key_kind {
            return Err(FeatureStoreError::Schema(format!(
                "event {}: entity_id '{}' is a {} key but the batch uses {} keys",
                i,
                e.entity_id,
                e.entity_id.kind(),
                key_kind
            )));
        }
        partitions.entry(&e.entity_id).or_default().push(e);
    }

    let entities: BTreeMap<EntityId, EntityFeatures> = partitions
        .into_iter()
        .map(|(id, mut partition)| {
            partition.sort_by_key(|e| e.timestamp);
            (id.clone(), materialize(id, &partition))
        })
        .collect();

    debug!(events = events.len(), entities = entities.len(), "aggregated event batch");
    Ok(FeatureTable::new(entities, key_kind))
}

/// Fold one entity's time-ordered events into its row and history.
fn materialize(entity_id: &EntityId, events: &[&Event]) -> EntityFeatures {
    let mut stats = ActivityStats::default();
    let mut history = FeatureHistory::default();
    for (i, e) in events.iter().enumerate() {
        stats.observe(e);
        let last_at_ts = events.get(i + 1).map_or(true, |next| next.timestamp != e.timestamp);
        if last_at_ts {
            history.push(e.timestamp, stats.to_row(entity_id.clone()));
        }
    }
    EntityFeatures {
        row: stats.to_row(entity_id.clone()),
        as_of: events.last().map(|e| e.timestamp).unwrap_or_default(),
        history,
    }
}

/// Event count per entity.
pub fn total_activities(events: &[Event]) -> BTreeMap<EntityId, u64> {
    let mut out = BTreeMap::new();
    for e in events {
        *out.entry(e.entity_id.clone()).or_insert(0) += 1;
    }
    out
}

/// Distinct viewed products per entity. Entities with no view events are absent.
pub fn unique_products_viewed(events: &[Event]) -> BTreeMap<EntityId, u64> {
    let mut viewed: BTreeMap<EntityId, Vec<&Event>> = BTreeMap::new();
    for e in events.iter().filter(|e| e.is_view()) {
        viewed.entry(e.entity_id.clone()).or_default().push(e);
    }
    viewed
        .into_iter()
        .map(|(id, views)| (id, ActivityStats::from_events(views).unique_products_viewed()))
        .collect()
}

/// Purchase events per entity. Entities with no purchases are absent.
pub fn purchase_counts(events: &[Event]) -> BTreeMap<EntityId, u64> {
    let mut out = BTreeMap::new();
    for e in events.iter().filter(|e| e.is_purchase()) {
        *out.entry(e.entity_id.clone()).or_insert(0) += 1;
    }
    out
}
