//! Lookup to find editions of a given work and the work of a given edition.
//!
//! Wikisource connects a published *edition* item to its abstract *work*
//! item through a configured pair of properties (edition-of on the edition,
//! edition on the work). [`EditionLookup`] walks one hop of that graph:
//! best statements only, value snaks only, and only values that reference
//! items. Entities that fail to resolve are skipped, never surfaced.

use std::sync::Arc;

use tracing::debug;

use super::entity::{Item, ItemId, PropertyId};
use super::lookup::{EntityLookup, LookupError, UsageAccumulator};

/// Resolves work items for editions and edition items for works.
///
/// Holds no state of its own beyond configuration; constructed per request
/// around the request-scoped lookup and accumulator.
pub struct EditionLookup {
    entities: Arc<dyn EntityLookup>,
    edition_property: PropertyId,
    edition_of_property: PropertyId,
    usage: Arc<dyn UsageAccumulator>,
}

impl EditionLookup {
    /// Creates a lookup over the given entity store.
    ///
    /// `edition_property` points work → edition; `edition_of_property`
    /// points edition → work.
    #[must_use]
    pub fn new(
        entities: Arc<dyn EntityLookup>,
        edition_property: PropertyId,
        edition_of_property: PropertyId,
        usage: Arc<dyn UsageAccumulator>,
    ) -> Self {
        Self {
            entities,
            edition_property,
            edition_of_property,
            usage,
        }
    }

    /// Returns the work items the given edition item belongs to.
    #[must_use]
    pub fn get_works(&self, item: &Item) -> Vec<Item> {
        self.item_values_for_item(item, &self.edition_of_property)
    }

    /// Returns the edition items of the given work item.
    #[must_use]
    pub fn get_editions(&self, item: &Item) -> Vec<Item> {
        self.item_values_for_item(item, &self.edition_property)
    }

    /// Resolves a bare item id and returns its work items. An id that cannot
    /// be resolved yields an empty list, not an error.
    #[must_use]
    pub fn get_works_by_id(&self, id: &ItemId) -> Vec<Item> {
        match self.entities.get_item(id) {
            Ok(item) => self.get_works(&item),
            Err(LookupError::NotFound { .. }) => {
                debug!(item = %id, "item not resolvable, no works");
                Vec::new()
            }
        }
    }

    fn item_values_for_item(&self, item: &Item, property: &PropertyId) -> Vec<Item> {
        let mut items = Vec::new();
        for id in self.item_id_values_for_item(item, property) {
            match self.entities.get_item(&id) {
                Ok(item) => items.push(item),
                Err(LookupError::NotFound { .. }) => {
                    debug!(item = %id, "referenced item not resolvable, skipping");
                }
            }
        }
        items
    }

    /// Item ids referenced by the best statements of `property` on `item`.
    ///
    /// Records exactly one statement usage of (item, property), independent
    /// of how many values come back.
    fn item_id_values_for_item(&self, item: &Item, property: &PropertyId) -> Vec<ItemId> {
        self.usage.add_statement_usage(item.id(), property);

        item.best_statements(property)
            .iter()
            .filter_map(|statement| statement.main_snak.item_id().cloned())
            .collect()
    }
}
