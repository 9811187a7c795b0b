//! Client for the Wikimedia OCR tool.
//!
//! The tool is a plain HTTP service: `GET {tool}/api.php` with an engine, a
//! language list, and an image URL returns `{"text": ...}` or
//! `{"error": ...}`. [`OcrTool`] wraps that call; [`OcrSession`] adds the
//! typed event stream the editing surface listens to, with a cancel switch
//! that suppresses a result already in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::engine::OcrEngine;
use super::error::OcrError;

/// Connect timeout for OCR requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total request timeout. OCR of a dense page can take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for the OCR tool.
///
/// Created once and reused; connection pooling comes from the inner
/// `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct OcrTool {
    client: Client,
    tool_url: String,
}

/// Response body of the tool's `api.php`.
#[derive(Debug, Deserialize)]
struct ToolResponse {
    text: Option<String>,
    error: Option<String>,
}

impl OcrTool {
    /// Creates a client for a tool base URL. A trailing slash on the URL is
    /// tolerated and trimmed.
    #[must_use]
    pub fn new(tool_url: &str) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            tool_url: tool_url.trim_end_matches('/').to_string(),
        }
    }

    /// The tool base URL (trimmed).
    #[must_use]
    pub fn tool_url(&self) -> &str {
        &self.tool_url
    }

    /// Builds the tool request URL:
    /// `{tool}/api.php?engine=E&langs[]=L…&image=I&uselang=U[&line_id=N]`.
    #[must_use]
    pub fn request_url(
        &self,
        image: &str,
        engine: OcrEngine,
        langs: &[String],
        uselang: &str,
        line_id: Option<u32>,
    ) -> String {
        let mut url = format!("{}/api.php?engine={}", self.tool_url, engine.as_str());
        for lang in langs {
            url.push_str("&langs[]=");
            url.push_str(&urlencoding::encode(lang));
        }
        url.push_str("&image=");
        url.push_str(&urlencoding::encode(image));
        url.push_str("&uselang=");
        url.push_str(&urlencoding::encode(uselang));
        if let Some(line_id) = line_id {
            url.push_str(&format!("&line_id={line_id}"));
        }
        url
    }

    /// Runs OCR on one image.
    ///
    /// # Errors
    ///
    /// [`OcrError::Http`] for transport failures, [`OcrError::Tool`] when
    /// the tool reports an error, [`OcrError::NoText`] when the tool answers
    /// without usable text.
    pub async fn extract_text(
        &self,
        image: &str,
        engine: OcrEngine,
        langs: &[String],
        uselang: &str,
    ) -> Result<String, OcrError> {
        let url = self.request_url(image, engine, langs, uselang, None);
        debug!(%url, "requesting OCR");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| OcrError::http(&url, e))?;
        let body: ToolResponse = response.json().await.map_err(|e| OcrError::http(&url, e))?;

        if let Some(error) = body.error {
            return Err(OcrError::tool(error));
        }
        match body.text {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(OcrError::NoText),
        }
    }
}

/// Events emitted while extracting text for the editing surface.
///
/// Ordering guarantee per extraction: `TextExtractStart`, then exactly one
/// of `TextExtracted`/`ExtractError` (unless cancelled), then
/// `TextExtractEnd`. `Cancelling` may appear between start and the result
/// and suppresses the pending result.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrEvent {
    /// An extraction request went out.
    TextExtractStart,
    /// Text came back.
    TextExtracted(String),
    /// The extraction failed.
    ExtractError(String),
    /// Cancellation was requested; the pending result will be dropped.
    Cancelling,
    /// The extraction settled, one way or the other.
    TextExtractEnd,
}

/// One extraction surface: a broadcast event stream plus a cancel switch.
#[derive(Debug)]
pub struct OcrSession {
    events: broadcast::Sender<OcrEvent>,
    cancelled: AtomicBool,
}

impl Default for OcrSession {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrSession {
    /// Creates a session.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            events,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Subscribes to the event stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OcrEvent> {
        self.events.subscribe()
    }

    /// Requests cancellation of the extraction in flight. The pending result
    /// will be suppressed; `TextExtractEnd` still fires.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.emit(OcrEvent::Cancelling);
        }
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn emit(&self, event: OcrEvent) {
        // No subscribers is fine; events are advisory.
        let _ = self.events.send(event);
    }

    /// Runs one extraction, emitting events around it.
    ///
    /// Returns `None` when the result was suppressed by cancellation,
    /// otherwise the extraction outcome.
    pub async fn extract(
        &self,
        tool: &OcrTool,
        image: &str,
        engine: OcrEngine,
        langs: &[String],
        uselang: &str,
    ) -> Option<Result<String, OcrError>> {
        self.cancelled.store(false, Ordering::SeqCst);
        self.emit(OcrEvent::TextExtractStart);

        let result = tool.extract_text(image, engine, langs, uselang).await;

        if self.is_cancelled() {
            warn!("OCR result suppressed by cancellation");
            self.emit(OcrEvent::TextExtractEnd);
            return None;
        }
        match &result {
            Ok(text) => self.emit(OcrEvent::TextExtracted(text.clone())),
            Err(e) => self.emit(OcrEvent::ExtractError(e.to_string())),
        }
        self.emit(OcrEvent::TextExtractEnd);
        Some(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_shape() {
        let tool = OcrTool::new("https://ocr.example.org/");
        let url = tool.request_url(
            "https://upload.example.org/page 1.jpg",
            OcrEngine::Google,
            &["en".to_string(), "fr".to_string()],
            "en",
            None,
        );
        assert_eq!(
            url,
            "https://ocr.example.org/api.php?engine=google&langs[]=en&langs[]=fr\
             &image=https%3A%2F%2Fupload.example.org%2Fpage%201.jpg&uselang=en"
        );
    }

    #[test]
    fn test_request_url_with_line_id() {
        let tool = OcrTool::new("https://ocr.example.org");
        let url = tool.request_url(
            "https://img",
            OcrEngine::Transkribus,
            &["la".to_string()],
            "de",
            Some(38),
        );
        assert!(url.ends_with("&uselang=de&line_id=38"));
        assert!(url.contains("engine=transkribus"));
    }

    #[test]
    fn test_cancel_is_sticky_and_emits_once() {
        let session = OcrSession::new();
        let mut events = session.subscribe();
        session.cancel();
        session.cancel();

        assert!(session.is_cancelled());
        assert_eq!(events.try_recv().unwrap(), OcrEvent::Cancelling);
        assert!(events.try_recv().is_err(), "second cancel emits nothing");
    }
}
