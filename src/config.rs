//! Externally supplied configuration.
//!
//! Deployments differ in which Wikibase properties model editions, where the
//! export tool lives, and whether the OCR tool is available at all. This
//! module holds that surface as one serde-loadable record with a `validate`
//! pass that turns setup mistakes into fatal, typed errors before any
//! network work starts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::wikibase::PropertyId;

/// Default Wikibase property linking a work to its editions.
pub const DEFAULT_EDITION_PROPERTY: &str = "P747";

/// Default Wikibase property linking an edition to its work.
pub const DEFAULT_EDITION_OF_PROPERTY: &str = "P629";

/// Default base URL of the export tool.
pub const DEFAULT_EXPORT_BASE_URL: &str = "https://ws-export.wmcloud.org";

/// Errors raised while loading or validating configuration. These are setup
/// failures, fatal before any request goes out.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this shape.
    #[error("failed to parse config: {source}")]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// OCR is enabled but no tool URL is configured.
    #[error("OCR is enabled but no OCR tool URL is configured")]
    MissingOcrUrl,

    /// A configured property id is malformed.
    #[error("invalid {role} property id: '{value}'")]
    InvalidProperty {
        /// Which setting held the bad value.
        role: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl ConfigError {
    /// Creates an [`ConfigError::Io`] error.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an [`ConfigError::InvalidProperty`] error.
    pub fn invalid_property(role: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidProperty {
            role,
            value: value.into(),
        }
    }
}

/// Configuration surface of the toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct WikisourceConfig {
    /// Property linking a work item to its edition items.
    pub edition_property: String,
    /// Property linking an edition item to its work item.
    pub edition_of_property: String,
    /// Base URL of the export tool.
    pub export_base_url: String,
    /// Whether OCR features are available.
    pub ocr_enabled: bool,
    /// Base URL of the OCR tool. May be empty only when OCR is disabled.
    pub ocr_url: String,
    /// Namespaces whose pages are offered for export.
    pub content_namespaces: Vec<i32>,
}

impl Default for WikisourceConfig {
    fn default() -> Self {
        Self {
            edition_property: DEFAULT_EDITION_PROPERTY.to_string(),
            edition_of_property: DEFAULT_EDITION_OF_PROPERTY.to_string(),
            export_base_url: DEFAULT_EXPORT_BASE_URL.to_string(),
            ocr_enabled: true,
            ocr_url: "https://ocr.wmcloud.org".to_string(),
            content_namespaces: vec![0],
        }
    }
}

impl WikisourceConfig {
    /// Loads and validates configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read, [`ConfigError::Parse`]
    /// when it is not valid JSON, plus anything [`Self::validate`] rejects.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates configuration from a JSON string. Missing fields
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON, plus anything
    /// [`Self::validate`] rejects.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingOcrUrl`] when OCR is enabled without a tool URL,
    /// [`ConfigError::InvalidProperty`] when a property id does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ocr_enabled && self.ocr_url.trim().is_empty() {
            return Err(ConfigError::MissingOcrUrl);
        }
        self.edition_property_id()?;
        self.edition_of_property_id()?;
        debug!(
            edition = self.edition_property,
            edition_of = self.edition_of_property,
            ocr_enabled = self.ocr_enabled,
            "configuration validated"
        );
        Ok(())
    }

    /// The edition property as a typed id.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidProperty`] when the value is malformed.
    pub fn edition_property_id(&self) -> Result<PropertyId, ConfigError> {
        PropertyId::new(self.edition_property.as_str())
            .map_err(|_| ConfigError::invalid_property("edition", &self.edition_property))
    }

    /// The edition-of property as a typed id.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidProperty`] when the value is malformed.
    pub fn edition_of_property_id(&self) -> Result<PropertyId, ConfigError> {
        PropertyId::new(self.edition_of_property.as_str())
            .map_err(|_| ConfigError::invalid_property("edition-of", &self.edition_of_property))
    }

    /// The OCR tool URL without any trailing slash.
    #[must_use]
    pub fn ocr_url_trimmed(&self) -> &str {
        self.ocr_url.trim_end_matches('/')
    }
}
