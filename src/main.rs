//! Feature store demo: raw activity events → aggregated features → simulated
//! historical retrieval for training and online retrieval for serving.
//! Results are written to stdout as JSON lines; logs go to stderr.

use feature_store_sim::{
    aggregate,
    config::StoreConfig,
    events::{parse_columns, parse_records, EntityKeyKind},
    store::{EntityRef, HistoricalRef, RetrievalSimulator},
    EntityId, Event, StructuredLogger,
};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Sample batch: five users, 2024-01-01 onward, one hour apart.
fn sample_events(entity_key: &str) -> Result<Vec<Event>, BoxError> {
    let batch = json!({
        entity_key: [1, 1, 1, 2, 2, 3, 3, 3, 3, 4, 4, 5],
        "activity_type": ["view", "view", "purchase", "view", "view",
                          "view", "click", "view", "purchase", "view", "purchase", "click"],
        "timestamp": [1704067200, 1704070800, 1704074400,
                      1704078000, 1704081600,
                      1704085200, 1704088800, 1704092400, 1704096000,
                      1704099600, 1704103200,
                      1704106800],
        "product_id": ["A", "B", "A", "C", "D", "E", "E", "F", "F", "G", "G", "H"]
    });
    Ok(parse_columns(&batch, entity_key)?)
}

fn load_events(config: &StoreConfig) -> Result<Vec<Event>, BoxError> {
    let entity_key = &config.feature_view.entity_key;
    match &config.events_path {
        Some(path) => {
            let data = std::fs::read_to_string(path)?;
            let records: Vec<serde_json::Value> = serde_json::from_str(&data)?;
            info!(path = %path.display(), "loaded event records");
            Ok(parse_records(&records, entity_key)?)
        }
        None => sample_events(entity_key),
    }
}

fn main() -> Result<(), BoxError> {
    let config_path = std::env::var("FEATURE_STORE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("feature_store.json"));
    let loaded = StoreConfig::try_load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    StructuredLogger::init(config.log.json, &config.log.level);
    if let Err(e) = &loaded {
        tracing::warn!(path = %config_path.display(), error = %e, "invalid config; using defaults");
    }
    let entity_key = config.feature_view.entity_key.clone();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let events = load_events(&config)?;
    let users: std::collections::HashSet<&EntityId> = events.iter().map(|e| &e.entity_id).collect();
    info!(records = events.len(), users = users.len(), "raw activity data");

    let table = Arc::new(aggregate(&events)?);
    info!(entities = table.len(), id = %table.materialization_id(), "engineered features");
    for row in table.rows() {
        StructuredLogger::emit_json(&json!({ "engineered": row }), &mut out)?;
    }

    let view = config.feature_view_spec()?;
    let feature_names: Vec<&str> = view.feature_names().collect();
    info!(
        view = %view.name,
        entity = %view.entity_key,
        features = ?feature_names,
        ttl_secs = view.ttl.as_secs(),
        "feature view defined"
    );

    let mut store = RetrievalSimulator::new(config.repo_path.clone());
    store.initialize(Arc::clone(&table), view)?;

    // Training: each entity at its latest event and one hour before its first.
    let mut queries = Vec::new();
    for id in table.entity_ids() {
        if let Some(entity) = table.entity(id) {
            let first = entity.history.snapshots().first().map_or(entity.as_of, |s| s.valid_from);
            queries.push(HistoricalRef::new(id.clone(), (first - 3600).max(0)));
            queries.push(HistoricalRef::new(id.clone(), entity.as_of));
        }
    }
    let frame = store.get_historical_features(&queries)?;
    info!(rows = frame.len(), "historical features retrieved");
    for row in frame.iter() {
        StructuredLogger::emit_json(&json!({ "historical": row.to_record(&entity_key) }), &mut out)?;
    }

    // Serving: a few known users plus one that never produced an event.
    let mut lookups: Vec<EntityRef> = table.entity_ids().step_by(2).cloned().map(EntityRef::new).collect();
    let unknown = match table.key_kind() {
        EntityKeyKind::Int => EntityId::Int(999),
        EntityKeyKind::Str => EntityId::from("unknown"),
    };
    lookups.push(EntityRef::new(unknown));
    let online = store.get_online_features(&lookups)?;
    info!(rows = online.len(), "online features retrieved");
    for row in &online {
        StructuredLogger::emit_json(&json!({ "online": row.to_record(&entity_key) }), &mut out)?;
    }

    out.flush()?;
    info!("demo complete");
    Ok(())
}
