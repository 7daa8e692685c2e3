//! Retrieval simulator: lifecycle, historical and online paths.

use feature_store_sim::store::{FeatureViewSpec, RetrievalSimulator};
use feature_store_sim::{
    aggregate, define_feature_view, initialize, ActivityType, EntityId, EntityRef, Event,
    FeatureName, FeatureStoreError, FeatureTable, HistoricalRef,
};
use std::sync::Arc;
use std::time::Duration;

fn table() -> Arc<FeatureTable> {
    let events = vec![
        Event::new(1, ActivityType::View, 100, Some("A")),
        Event::new(1, ActivityType::Purchase, 200, Some("A")),
        Event::new(2, ActivityType::View, 150, Some("B")),
        Event::new(2, ActivityType::View, 250, Some("C")),
        Event::new(3, ActivityType::Click, 300, Some("D")),
    ];
    Arc::new(aggregate(&events).unwrap())
}

fn ready() -> RetrievalSimulator {
    initialize(table(), FeatureViewSpec::user_activity()).unwrap()
}

#[test]
fn retrieval_before_initialize_fails() {
    let sim = RetrievalSimulator::new("repo");
    assert!(!sim.is_ready());
    assert!(sim.info().is_none());

    let err = sim.get_online_features(&[EntityRef::new(1)]).unwrap_err();
    assert!(matches!(err, FeatureStoreError::NotInitialized(_)));
    assert_eq!(err.kind(), "not_initialized");

    let err = sim
        .get_historical_features(&[HistoricalRef::new(1, 100)])
        .unwrap_err();
    assert!(matches!(err, FeatureStoreError::NotInitialized(_)));
}

#[test]
fn initialize_moves_to_ready_once() {
    let mut sim = RetrievalSimulator::new("feature_repo");
    sim.initialize(table(), FeatureViewSpec::user_activity()).unwrap();
    assert!(sim.is_ready());
    assert_eq!(sim.info().unwrap().repo_path.to_str(), Some("feature_repo"));
    assert_eq!(sim.feature_view().unwrap().name, "user_activity_features");
    assert_eq!(sim.table().unwrap().len(), 3);

    let err = sim
        .initialize(table(), FeatureViewSpec::user_activity())
        .unwrap_err();
    assert!(matches!(err, FeatureStoreError::InvalidInput(_)));
    assert!(sim.is_ready());
}

#[test]
fn online_preserves_order_and_isolates_missing_entities() {
    let sim = ready();
    let refs = [EntityRef::new(1), EntityRef::new(99), EntityRef::new(2)];
    let rows = sim.get_online_features(&refs).unwrap();

    assert_eq!(rows.len(), 3);
    let ids: Vec<_> = rows.iter().map(|r| r.entity_id.clone()).collect();
    assert_eq!(ids, vec![EntityId::Int(1), EntityId::Int(99), EntityId::Int(2)]);

    assert_eq!(rows[0].get(FeatureName::TotalActivities), Some(2));
    assert_eq!(rows[0].get(FeatureName::PurchaseCount), Some(1));
    assert!(rows[1].is_missing());
    assert_eq!(rows[1].features.len(), 3);
    assert_eq!(rows[2].get(FeatureName::UniqueProductsViewed), Some(2));
    assert_eq!(rows[2].get(FeatureName::PurchaseCount), Some(0));
}

#[test]
fn online_keeps_duplicates() {
    let sim = ready();
    let rows = sim
        .get_online_features(&[EntityRef::new(3), EntityRef::new(3)])
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], rows[1]);
}

#[test]
fn online_record_uses_null_for_missing() {
    let sim = ready();
    let rows = sim.get_online_features(&[EntityRef::new(99)]).unwrap();
    let record = rows[0].to_record("user_id");
    assert_eq!(record["user_id"], 99);
    assert!(record["total_activities"].is_null());
    assert!(!record.contains_key("event_timestamp"));
}

#[test]
fn historical_record_carries_timestamp_and_nulls() {
    let sim = ready();
    let frame = sim
        .get_historical_features(&[HistoricalRef::new(1, 250), HistoricalRef::new(99, 250)])
        .unwrap();

    let known = frame.rows[0].to_record("user_id");
    assert_eq!(known["user_id"], 1);
    assert_eq!(known["event_timestamp"], 250);
    assert_eq!(known["total_activities"], 2);
    assert_eq!(known["purchase_count"], 1);

    let missing = frame.rows[1].to_record("user_id");
    assert_eq!(missing["user_id"], 99);
    assert_eq!(missing["event_timestamp"], 250);
    assert!(missing["total_activities"].is_null());
    assert!(missing["unique_products_viewed"].is_null());
    assert!(missing["purchase_count"].is_null());
}

#[test]
fn historical_is_point_in_time() {
    let sim = ready();
    let refs = [
        HistoricalRef::new(1, 250),
        HistoricalRef::new(1, 150),
        HistoricalRef::new(1, 50),
        HistoricalRef::new(42, 500),
        HistoricalRef::new(2, 250),
    ];
    let frame = sim.get_historical_features(&refs).unwrap();
    assert_eq!(frame.len(), 5);
    assert_eq!(frame.features, FeatureName::ALL.to_vec());

    let latest = &frame.rows[0];
    assert_eq!(latest.event_timestamp, 250);
    assert_eq!(latest.feature_timestamp, Some(200));
    assert_eq!(latest.get(FeatureName::TotalActivities), Some(2));
    assert_eq!(latest.get(FeatureName::PurchaseCount), Some(1));

    let before_purchase = &frame.rows[1];
    assert_eq!(before_purchase.feature_timestamp, Some(100));
    assert_eq!(before_purchase.get(FeatureName::TotalActivities), Some(1));
    assert_eq!(before_purchase.get(FeatureName::PurchaseCount), Some(0));

    let before_first = &frame.rows[2];
    assert!(before_first.is_missing());
    assert_eq!(before_first.feature_timestamp, None);

    assert_eq!(frame.rows[3].entity_id, EntityId::Int(42));
    assert!(frame.rows[3].is_missing());

    assert_eq!(frame.rows[4].get(FeatureName::UniqueProductsViewed), Some(2));
}

#[test]
fn historical_rejects_negative_timestamps() {
    let sim = ready();
    let err = sim
        .get_historical_features(&[HistoricalRef::new(1, 100), HistoricalRef::new(2, -1)])
        .unwrap_err();
    assert!(matches!(err, FeatureStoreError::InvalidInput(_)));
}

#[test]
fn mismatched_key_kind_is_schema_error() {
    let sim = ready();
    let err = sim.get_online_features(&[EntityRef::new("1")]).unwrap_err();
    assert!(matches!(err, FeatureStoreError::Schema(_)));
    let err = sim
        .get_historical_features(&[HistoricalRef::new("1", 0)])
        .unwrap_err();
    assert!(matches!(err, FeatureStoreError::Schema(_)));
}

#[test]
fn view_projects_selected_features() {
    let view = define_feature_view(
        "purchases",
        &["purchase_count", "total_activities"],
        "user_id",
        Duration::from_secs(60),
    )
    .unwrap();
    let sim = initialize(table(), view).unwrap();

    let rows = sim.get_online_features(&[EntityRef::new(1)]).unwrap();
    let names: Vec<_> = rows[0].features.iter().map(|f| f.name).collect();
    assert_eq!(names, vec![FeatureName::PurchaseCount, FeatureName::TotalActivities]);
    assert_eq!(rows[0].get(FeatureName::UniqueProductsViewed), None);

    let frame = sim
        .get_historical_features(&[HistoricalRef::new(1, 300), HistoricalRef::new(7, 300)])
        .unwrap();
    let m = frame.to_array();
    assert_eq!(m.shape(), &[2, 2]);
    assert_eq!(m[[0, 0]], 1.0);
    assert_eq!(m[[0, 1]], 2.0);
    assert!(m[[1, 0]].is_nan());
}

#[test]
fn unknown_view_feature_fails_initialize() {
    let view = define_feature_view("v", &["lifetime_value"], "user_id", Duration::ZERO).unwrap();
    let err = initialize(table(), view).unwrap_err();
    assert!(matches!(err, FeatureStoreError::Schema(ref m) if m.contains("lifetime_value")));
}

#[test]
fn define_feature_view_validates() {
    let empty: [&str; 0] = [];
    assert!(matches!(
        define_feature_view("v", &empty, "user_id", Duration::ZERO).unwrap_err(),
        FeatureStoreError::InvalidInput(_)
    ));
    assert!(matches!(
        define_feature_view("v", &["purchase_count", "purchase_count"], "user_id", Duration::ZERO)
            .unwrap_err(),
        FeatureStoreError::InvalidInput(_)
    ));
    assert!(matches!(
        define_feature_view("", &["purchase_count"], "user_id", Duration::ZERO).unwrap_err(),
        FeatureStoreError::InvalidInput(_)
    ));

    let view = define_feature_view("v", &["purchase_count"], "user_id", Duration::from_secs(86400))
        .unwrap()
        .with_description("purchases only")
        .with_source("push_source");
    assert_eq!(view.features.len(), 1);
    assert_eq!(view.ttl.as_secs(), 86400);
    assert_eq!(view.description.as_deref(), Some("purchases only"));
}

#[test]
fn ready_simulator_is_shared_across_threads() {
    let sim = ready();
    std::thread::scope(|s| {
        let handles: Vec<_> = (1..=3)
            .map(|id| {
                let sim = &sim;
                s.spawn(move || sim.get_online_features(&[EntityRef::new(id)]).unwrap())
            })
            .collect();
        for h in handles {
            let rows = h.join().unwrap();
            assert!(!rows[0].is_missing());
        }
    });
}
