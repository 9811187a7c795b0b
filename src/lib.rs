//! Wikisource Toolkit Core Library
//!
//! This library provides the core functionality for the wstools command-line
//! tool, which brings Wikisource-specific plumbing to plain Rust: export-tool
//! URL construction, edition/work resolution over Wikibase entities with
//! sitelink propagation, and a batched bulk-OCR pipeline over the MediaWiki
//! action API and the Wikimedia OCR tool.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`wikibase`] - Entity model, edition/work lookup, sitelink propagation
//! - [`export`] - WS Export tool URL construction and sidebar link building
//! - [`ocr`] - OCR tool client, preferences, and the bulk OCR workflow
//! - [`config`] - Externally supplied configuration surface

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod export;
pub mod ocr;
pub mod wikibase;

// Re-export commonly used types
pub use config::{ConfigError, WikisourceConfig};
pub use export::{ExportLink, ExportUrlBuilder, PageContext};
pub use ocr::{
    BulkOcr, BulkOcrReport, DEFAULT_BATCH_SIZE, MwApiClient, Notice, Notifier, OcrEngine,
    OcrError, OcrEvent, OcrSession, OcrTool,
};
pub use wikibase::{
    EditionLookup, EntityLookup, Item, ItemId, LookupError, PropertyId, SiteLink,
    SitelinkPropagator, UsageAccumulator,
};
