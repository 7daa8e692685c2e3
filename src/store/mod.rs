//! Simulated feature store: binds a materialized feature table to a feature
//! view and serves it through a historical (training) path and an online
//! (serving) path.
//!
//! The simulator starts uninitialized and moves to ready exactly once, via
//! [`RetrievalSimulator::initialize`]. Both read paths fail with
//! `NotInitialized` until then.

mod retrieval;
mod view;

pub use retrieval::{EntityRef, FeatureValue, HistoricalFrame, HistoricalRef, HistoricalRow, OnlineRow};
pub use view::{
    define_feature_view, FeatureDtype, FeatureField, FeatureViewSpec, USER_ACTIVITY_VIEW,
    USER_ENTITY_KEY,
};

use crate::error::{FeatureStoreError, Result};
use crate::features::FeatureTable;
use chrono::{DateTime, Utc};
use retrieval::ReadyStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Where and when the store was brought up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub repo_path: PathBuf,
    pub initialized_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
enum StoreState {
    Uninitialized,
    Ready(Box<ReadyStore>, StoreInfo),
}

#[derive(Debug, Clone)]
pub struct RetrievalSimulator {
    repo_path: PathBuf,
    state: StoreState,
}

impl Default for RetrievalSimulator {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Build a ready simulator in one step.
pub fn initialize(table: Arc<FeatureTable>, view: FeatureViewSpec) -> Result<RetrievalSimulator> {
    let mut sim = RetrievalSimulator::default();
    sim.initialize(table, view)?;
    Ok(sim)
}

impl RetrievalSimulator {
    /// New uninitialized simulator for the given repository path.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            state: StoreState::Uninitialized,
        }
    }

    /// Bind a feature table and view. Only valid once per simulator.
    pub fn initialize(&mut self, table: Arc<FeatureTable>, view: FeatureViewSpec) -> Result<()> {
        if let StoreState::Ready(ready, _) = &self.state {
            return Err(FeatureStoreError::InvalidInput(format!(
                "simulator already initialized with feature view '{}'",
                ready.view.name
            )));
        }
        let ready = ReadyStore::bind(table, view)?;
        let info = StoreInfo {
            repo_path: self.repo_path.clone(),
            initialized_at: Utc::now(),
        };
        info!(
            view = %ready.view.name,
            entities = ready.table.len(),
            features = ready.projection.len(),
            repo_path = %info.repo_path.display(),
            "feature store initialized"
        );
        self.state = StoreState::Ready(Box::new(ready), info);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, StoreState::Ready(..))
    }

    pub fn info(&self) -> Option<&StoreInfo> {
        match &self.state {
            StoreState::Ready(_, info) => Some(info),
            StoreState::Uninitialized => None,
        }
    }

    pub fn feature_view(&self) -> Option<&FeatureViewSpec> {
        self.ready_store().map(|r| &r.view)
    }

    pub fn table(&self) -> Option<&Arc<FeatureTable>> {
        self.ready_store().map(|r| &r.table)
    }

    /// Point-in-time join: for each query, the latest snapshot at or before its timestamp.
    pub fn get_historical_features(&self, refs: &[HistoricalRef]) -> Result<HistoricalFrame> {
        self.ready("get_historical_features")?.historical(refs)
    }

    /// Latest feature values per entity, one row per reference in input order.
    pub fn get_online_features(&self, refs: &[EntityRef]) -> Result<Vec<OnlineRow>> {
        self.ready("get_online_features")?.online(refs)
    }

    fn ready_store(&self) -> Option<&ReadyStore> {
        match &self.state {
            StoreState::Ready(ready, _) => Some(&**ready),
            StoreState::Uninitialized => None,
        }
    }

    fn ready(&self, op: &str) -> Result<&ReadyStore> {
        self.ready_store().ok_or_else(|| {
            FeatureStoreError::NotInitialized(format!(
                "{} called before the feature store was initialized",
                op
            ))
        })
    }
}
