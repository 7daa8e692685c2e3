//! Raw user-activity events: shared types plus parsing from JSON records
//! and column-oriented batches.

mod columns;
mod record;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use columns::parse_columns;
pub use record::parse_records;

/// Identifier of the entity (user) an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

/// Kind of an [`EntityId`]; a single table only ever holds one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKeyKind {
    Int,
    Str,
}

impl EntityId {
    pub fn kind(&self) -> EntityKeyKind {
        match self {
            EntityId::Int(_) => EntityKeyKind::Int,
            EntityId::Str(_) => EntityKeyKind::Str,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(i) => write!(f, "{}", i),
            EntityId::Str(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for EntityKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKeyKind::Int => f.write_str("integer"),
            EntityKeyKind::Str => f.write_str("string"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        EntityId::Int(v)
    }
}

impl From<&str> for EntityId {
    fn from(v: &str) -> Self {
        EntityId::Str(v.to_string())
    }
}

impl From<String> for EntityId {
    fn from(v: String) -> Self {
        EntityId::Str(v)
    }
}

/// Activity recorded by an event. Unrecognized names deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    View,
    Click,
    Purchase,
    #[serde(other)]
    Other,
}

impl ActivityType {
    pub fn parse(name: &str) -> Self {
        match name {
            "view" => ActivityType::View,
            "click" => ActivityType::Click,
            "purchase" => ActivityType::Purchase,
            _ => ActivityType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::View => "view",
            ActivityType::Click => "click",
            ActivityType::Purchase => "purchase",
            ActivityType::Other => "other",
        }
    }
}

/// One immutable activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub entity_id: EntityId,
    pub activity_type: ActivityType,
    /// Epoch seconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

impl Event {
    pub fn new(
        entity_id: impl Into<EntityId>,
        activity_type: ActivityType,
        timestamp: i64,
        product_id: Option<&str>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            activity_type,
            timestamp,
            product_id: product_id.map(String::from),
        }
    }

    pub fn is_view(&self) -> bool {
        self.activity_type == ActivityType::View
    }

    pub fn is_purchase(&self) -> bool {
        self.activity_type == ActivityType::Purchase
    }
}
