//! Feature store simulator — user-activity feature aggregation with
//! simulated offline and online retrieval.
//!
//! Modular structure:
//! - [`events`] — Activity event model and parsing from JSON records or columns
//! - [`features`] — Per-entity aggregation into a versioned feature table
//! - [`store`] — Feature views and the historical/online retrieval simulator
//! - [`config`] — JSON configuration
//! - [`logging`] — Structured logging
//! - [`error`] — Error taxonomy

pub mod config;
pub mod error;
pub mod events;
pub mod features;
pub mod logging;
pub mod store;

pub use config::StoreConfig;
pub use error::{FeatureStoreError, Result};
pub use events::{ActivityType, EntityId, Event};
pub use features::{aggregate, FeatureName, FeatureRow, FeatureTable};
pub use logging::StructuredLogger;
pub use store::{
    define_feature_view, initialize, EntityRef, FeatureViewSpec, HistoricalFrame, HistoricalRef,
    OnlineRow, RetrievalSimulator,
};
