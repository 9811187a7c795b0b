//! OCR engine selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The OCR engines the Wikimedia OCR tool exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngine {
    /// Tesseract, the default engine.
    #[default]
    Tesseract,
    /// Google Cloud Vision.
    Google,
    /// Transkribus (handwriting models).
    Transkribus,
}

impl OcrEngine {
    /// The engine name as the tool's `engine` query parameter expects it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OcrEngine::Tesseract => "tesseract",
            OcrEngine::Google => "google",
            OcrEngine::Transkribus => "transkribus",
        }
    }
}

impl fmt::Display for OcrEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown engine name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown OCR engine: {0} (expected tesseract, google, or transkribus)")]
pub struct EngineParseError(pub String);

impl FromStr for OcrEngine {
    type Err = EngineParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tesseract" => Ok(OcrEngine::Tesseract),
            "google" => Ok(OcrEngine::Google),
            "transkribus" => Ok(OcrEngine::Transkribus),
            other => Err(EngineParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_round_trip() {
        for engine in [OcrEngine::Tesseract, OcrEngine::Google, OcrEngine::Transkribus] {
            assert_eq!(engine.as_str().parse::<OcrEngine>().unwrap(), engine);
        }
    }

    #[test]
    fn test_engine_default_is_tesseract() {
        assert_eq!(OcrEngine::default(), OcrEngine::Tesseract);
    }

    #[test]
    fn test_engine_parse_unknown() {
        let err = "abbyy".parse::<OcrEngine>().unwrap_err();
        assert!(err.to_string().contains("abbyy"));
    }

    #[test]
    fn test_engine_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&OcrEngine::Google).unwrap(),
            "\"google\""
        );
        let engine: OcrEngine = serde_json::from_str("\"tesseract\"").unwrap();
        assert_eq!(engine, OcrEngine::Tesseract);
    }
}
