//! OCR tooling: the Wikimedia OCR tool client and the bulk OCR workflow.
//!
//! Two entry points sit here. [`OcrTool`] is the single-page client: given
//! an image URL it asks the external OCR tool for text, reporting progress
//! through a typed [`OcrEvent`] stream with cancellation. [`BulkOcr`] is the
//! batch workflow over a ProofreadPage index: it discovers untranscribed
//! pages through the MediaWiki action API, fetches their page images, OCRs
//! them in fixed-size batches with a fixed inter-batch delay, and writes the
//! results back with create-only edits.
//!
//! # Failure model
//!
//! Stage failures before anything is written (page discovery, image fetch)
//! abort the whole run. Per-item OCR and save failures are recorded and
//! reported but never abort; the run always reaches its success notification
//! with the failure list embedded (see [`Notice`]).

mod api;
mod bulk;
mod engine;
mod error;
mod prefs;
mod tool;

pub use api::{IndexPage, MwApiClient, PageImage};
pub use bulk::{
    BulkOcr, BulkOcrReport, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE, Notice, Notifier,
};
pub use engine::OcrEngine;
pub use error::OcrError;
pub use prefs::{
    LEGACY_PREF_KEY, MemoryPrefStore, OcrPreferences, PrefStore, account_pref_key, load_prefs,
    save_prefs,
};
pub use tool::{OcrEvent, OcrSession, OcrTool};
