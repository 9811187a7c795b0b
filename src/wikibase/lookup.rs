//! Entity lookup and usage-tracking seams.
//!
//! Entity storage belongs to the host system; the toolkit only sees it
//! through the [`EntityLookup`] trait. A lookup either finds an item or
//! reports [`LookupError::NotFound`] - a typed result, so callers translate
//! missing entities into empty results without any exception-catching idiom.
//!
//! [`UsageAccumulator`] is the companion recording seam: every entity aspect
//! read during a request is reported so the host's cache invalidation stays
//! correct when the underlying statements or sitelinks change.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use super::entity::{Item, ItemId, PropertyId};

/// Errors from entity resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The entity cannot be resolved: deleted, access-restricted, or the
    /// lookup's per-request fetch budget is exhausted. All three collapse to
    /// the same outcome for callers - treat the entity as absent.
    #[error("entity {id} not found")]
    NotFound {
        /// The id that failed to resolve.
        id: ItemId,
    },
}

impl LookupError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(id: ItemId) -> Self {
        Self::NotFound { id }
    }
}

/// Read access to a Wikibase entity store.
pub trait EntityLookup: Send + Sync {
    /// Resolves an item by id.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] when the item cannot be resolved.
    fn get_item(&self, id: &ItemId) -> Result<Item, LookupError>;
}

/// Fire-and-forget recording of which entity aspects were read.
pub trait UsageAccumulator: Send + Sync {
    /// Records that statements of `property` on `item` were read.
    fn add_statement_usage(&self, item: &ItemId, property: &PropertyId);

    /// Records that `item`'s sitelinks were read.
    fn add_sitelinks_usage(&self, item: &ItemId);
}

/// A single recorded usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageRecord {
    /// Statement usage of (item, property).
    Statement(ItemId, PropertyId),
    /// Sitelinks usage of an item.
    Sitelinks(ItemId),
}

/// [`UsageAccumulator`] that keeps every record in memory. Used by the CLI
/// (to print what a request would have tracked) and by tests.
#[derive(Debug, Default)]
pub struct RecordingUsageAccumulator {
    records: Mutex<Vec<UsageRecord>>,
}

impl RecordingUsageAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all records in the order they were added.
    #[must_use]
    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl UsageAccumulator for RecordingUsageAccumulator {
    fn add_statement_usage(&self, item: &ItemId, property: &PropertyId) {
        if let Ok(mut records) = self.records.lock() {
            records.push(UsageRecord::Statement(item.clone(), property.clone()));
        }
    }

    fn add_sitelinks_usage(&self, item: &ItemId) {
        if let Ok(mut records) = self.records.lock() {
            records.push(UsageRecord::Sitelinks(item.clone()));
        }
    }
}

/// In-memory [`EntityLookup`] over a fixed set of items.
///
/// The CLI builds one from an entity JSON file (an array of Wikibase entity
/// objects); tests build one from fixture items.
#[derive(Debug, Default)]
pub struct StaticEntityLookup {
    items: HashMap<ItemId, Item>,
}

impl StaticEntityLookup {
    /// Creates a lookup over the given items.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| (item.id().clone(), item))
                .collect(),
        }
    }

    /// Loads a lookup from a JSON array of Wikibase entity objects.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for malformed input.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        Ok(Self::from_items(items))
    }

    /// Number of loaded items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the lookup is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl EntityLookup for StaticEntityLookup {
    fn get_item(&self, id: &ItemId) -> Result<Item, LookupError> {
        self.items
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::not_found(id.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn q(n: u32) -> ItemId {
        ItemId::new(format!("Q{n}")).unwrap()
    }

    #[test]
    fn test_static_lookup_finds_loaded_item() {
        let lookup = StaticEntityLookup::from_items([Item::new(q(1)), Item::new(q(2))]);
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get_item(&q(1)).unwrap().id(), &q(1));
    }

    #[test]
    fn test_static_lookup_missing_item_is_not_found() {
        let lookup = StaticEntityLookup::from_items([Item::new(q(1))]);
        assert_eq!(
            lookup.get_item(&q(9)),
            Err(LookupError::not_found(q(9)))
        );
    }

    #[test]
    fn test_static_lookup_from_json() {
        let json = r#"[
            { "id": "Q1", "claims": {}, "sitelinks": {} },
            { "id": "Q2" }
        ]"#;
        let lookup = StaticEntityLookup::from_json_str(json).unwrap();
        assert_eq!(lookup.len(), 2);
        assert!(lookup.get_item(&q(2)).is_ok());
    }

    #[test]
    fn test_recording_accumulator_keeps_order() {
        let usage = RecordingUsageAccumulator::new();
        let p629 = PropertyId::new("P629").unwrap();
        usage.add_statement_usage(&q(1), &p629);
        usage.add_sitelinks_usage(&q(2));

        assert_eq!(
            usage.records(),
            vec![
                UsageRecord::Statement(q(1), p629),
                UsageRecord::Sitelinks(q(2)),
            ]
        );
    }
}
