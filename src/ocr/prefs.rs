//! Persisted OCR preferences.
//!
//! The editor remembers the chosen engine, language list, and whether the
//! onboarding popup is still due. The record is stored as JSON in a
//! key-value [`PrefStore`] owned by the host: anonymous users share one
//! legacy key, logged-in users get a per-account key. A value found under
//! the legacy key while the user is authenticated migrates silently to the
//! account key.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::OcrEngine;

/// Storage key used before preferences became per-account, still used for
/// anonymous users.
pub const LEGACY_PREF_KEY: &str = "wikisource-ocr-options";

/// Storage key for an authenticated user.
#[must_use]
pub fn account_pref_key(user: &str) -> String {
    format!("{LEGACY_PREF_KEY}-{user}")
}

/// The persisted preference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPreferences {
    /// Selected OCR engine.
    pub engine: OcrEngine,
    /// Selected language codes, most recently used first.
    pub langs: Vec<String>,
    /// Whether the onboarding popup should still be shown.
    pub show_onboarding: bool,
}

impl OcrPreferences {
    /// The defaults for a wiki: tesseract, the wiki's content language, and
    /// onboarding still due.
    #[must_use]
    pub fn default_for(content_language: &str) -> Self {
        Self {
            engine: OcrEngine::Tesseract,
            langs: vec![content_language.to_string()],
            show_onboarding: true,
        }
    }
}

/// Key-value preference storage, scoped per user by the caller through the
/// key names.
pub trait PrefStore: Send + Sync {
    /// Reads a stored value.
    fn get(&self, key: &str) -> Option<String>;
    /// Writes a value.
    fn set(&self, key: &str, value: &str);
    /// Removes a value.
    fn remove(&self, key: &str);
}

/// In-memory [`PrefStore`].
#[derive(Debug, Default)]
pub struct MemoryPrefStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPrefStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryPrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
    }
}

/// Loads preferences for a user (`None` = anonymous), applying defaults when
/// nothing (or something unreadable) is stored.
///
/// When the user is authenticated and only the legacy anonymous key holds a
/// value, that value is migrated to the account key and the legacy key is
/// cleared.
#[must_use]
pub fn load_prefs(
    store: &dyn PrefStore,
    user: Option<&str>,
    content_language: &str,
) -> OcrPreferences {
    let key = user.map_or_else(|| LEGACY_PREF_KEY.to_string(), account_pref_key);

    if user.is_some() && store.get(&key).is_none() {
        if let Some(legacy) = store.get(LEGACY_PREF_KEY) {
            debug!("migrating OCR preferences from legacy anonymous storage");
            store.set(&key, &legacy);
            store.remove(LEGACY_PREF_KEY);
        }
    }

    store
        .get(&key)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_else(|| OcrPreferences::default_for(content_language))
}

/// Persists preferences for a user (`None` = anonymous).
pub fn save_prefs(store: &dyn PrefStore, user: Option<&str>, prefs: &OcrPreferences) {
    let key = user.map_or_else(|| LEGACY_PREF_KEY.to_string(), account_pref_key);
    if let Ok(raw) = serde_json::to_string(prefs) {
        store.set(&key, &raw);
    }
}
