//! Wikibase entity model and Wikisource-specific lookups.
//!
//! This module provides a small, self-contained view of the Wikibase data
//! model (items, statements, snaks, sitelinks) plus the two pieces of logic
//! Wikisource layers on top of it:
//!
//! - [`EditionLookup`] walks the statement graph between *edition* items and
//!   *work* items through a configured pair of properties.
//! - [`SitelinkPropagator`] merges a work item's sitelinks into a sidebar or
//!   a flat sitelink collection, never overwriting entries that are already
//!   present.
//!
//! Entity storage itself is external: callers supply an [`EntityLookup`]
//! implementation (and a [`UsageAccumulator`] so the host system can track
//! which entity aspects were read).

mod edition;
mod entity;
mod lookup;
mod sitelink;

pub use edition::EditionLookup;
pub use entity::{IdParseError, Item, ItemId, PropertyId, Rank, SiteLink, Snak, SnakValue, Statement};
pub use lookup::{
    EntityLookup, LookupError, RecordingUsageAccumulator, StaticEntityLookup, UsageAccumulator,
    UsageRecord,
};
pub use sitelink::{
    BadgeDisplay, Sidebar, SidebarLink, Site, SiteDirectory, SitelinkPropagator,
    StaticBadgeDisplay, StaticSiteDirectory,
};
