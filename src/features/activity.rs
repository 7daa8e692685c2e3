//! Running activity statistics for a single entity.

use super::FeatureRow;
use crate::events::{ActivityType, EntityId, Event};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ActivityStats {
    /// Events of any type, unrecognized types included
    pub total_activities: u64,
    pub purchase_count: u64,
    /// Distinct non-null product ids among view events
    viewed_products: HashSet<String>,
}

impl ActivityStats {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut s = ActivityStats::default();
        for e in events {
            s.observe(e);
        }
        s
    }

    pub fn observe(&mut self, event: &Event) {
        self.total_activities += 1;
        match event.activity_type {
            ActivityType::View => {
                if let Some(ref p) = event.product_id {
                    self.viewed_products.insert(p.clone());
                }
            }
            ActivityType::Purchase => self.purchase_count += 1,
            ActivityType::Click | ActivityType::Other => {}
        }
    }

    pub fn unique_products_viewed(&self) -> u64 {
        self.viewed_products.len() as u64
    }

    pub fn to_row(&self, entity_id: EntityId) -> FeatureRow {
        FeatureRow {
            entity_id,
            total_activities: self.total_activities,
            unique_products_viewed: self.unique_products_viewed(),
            purchase_count: self.purchase_count,
        }
    }
}
