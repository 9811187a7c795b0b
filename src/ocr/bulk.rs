//! Bulk OCR workflow over a ProofreadPage index.
//!
//! One `run` walks the whole pipeline: discover the untranscribed pages of
//! an index window, resolve their scan images, OCR them in fixed-size
//! batches, and save the recognized text back with create-only edits.
//! Requests inside a batch are in flight simultaneously; batches follow
//! each other strictly sequentially with a fixed delay in between - that
//! delay is the only throttling, there is no backoff.
//!
//! The OCR dictionary is local to each `run`, so overlapping runs stay
//! independent, and create-only saves keep double submission harmless.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::api::MwApiClient;
use super::engine::OcrEngine;
use super::error::OcrError;
use super::tool::OcrTool;

/// Default number of requests in flight per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default delay between batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);

/// User-visible progress notices, in the order the workflow can emit them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The workflow started and is discovering pages.
    InProgress,
    /// No untranscribed pages in the requested window; nothing to do.
    NoPagesFound,
    /// Page discovery failed; the run is aborted.
    FetchPagesFailed,
    /// Image resolution failed; the run is aborted.
    FetchImagesFailed,
    /// OCR of one page failed; the run continues without it.
    OcrPageFailed {
        /// The page whose OCR failed.
        title: String,
    },
    /// Running OCR counter, updated after every settled page.
    OcrProgress {
        /// Pages settled so far (success or failure).
        done: usize,
        /// Pages being OCRed in this run.
        total: usize,
    },
    /// Running save counter with the failures so far.
    SaveProgress {
        /// Pages saved so far.
        saved: usize,
        /// Pages being saved in this run.
        total: usize,
        /// Titles whose save failed so far.
        failed: Vec<String>,
    },
    /// The run finished; failures (if any) are listed, not fatal.
    Completed {
        /// Pages saved.
        saved: usize,
        /// Titles whose save failed.
        failed: Vec<String>,
    },
}

/// Sink for progress notices. The CLI renders them as a live progress line;
/// tests record them.
pub trait Notifier: Send + Sync {
    /// Delivers one notice.
    fn notify(&self, notice: Notice);
}

/// Outcome of one bulk OCR run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOcrReport {
    /// Untranscribed pages discovered in the window.
    pub discovered: usize,
    /// Pages whose OCR produced text.
    pub transcribed: usize,
    /// Titles saved successfully, in save order.
    pub saved: Vec<String>,
    /// Titles whose OCR failed (absent from the save set).
    pub ocr_failures: Vec<String>,
    /// Titles whose save failed.
    pub save_failures: Vec<String>,
}

/// The bulk OCR workflow.
pub struct BulkOcr {
    api: MwApiClient,
    tool: OcrTool,
    engine: OcrEngine,
    langs: Vec<String>,
    uselang: String,
    server_url: Option<String>,
    start_index: usize,
    page_count: Option<usize>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BulkOcr {
    /// Creates a workflow with default engine (tesseract), language (`en`),
    /// whole-index window, and default batching.
    #[must_use]
    pub fn new(api: MwApiClient, tool: OcrTool) -> Self {
        Self {
            api,
            tool,
            engine: OcrEngine::default(),
            langs: vec!["en".to_string()],
            uselang: "en".to_string(),
            server_url: None,
            start_index: 0,
            page_count: None,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    /// Sets the OCR engine.
    #[must_use]
    pub fn with_engine(mut self, engine: OcrEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Sets the OCR language codes.
    #[must_use]
    pub fn with_langs(mut self, langs: Vec<String>) -> Self {
        if !langs.is_empty() {
            self.langs = langs;
        }
        self
    }

    /// Sets the interface language forwarded to the tool.
    #[must_use]
    pub fn with_uselang(mut self, uselang: impl Into<String>) -> Self {
        self.uselang = uselang.into();
        self
    }

    /// Restricts the run to `page_count` pages starting at `start_index`
    /// within the index's page order.
    #[must_use]
    pub fn with_window(mut self, start_index: usize, page_count: Option<usize>) -> Self {
        self.start_index = start_index;
        self.page_count = page_count;
        self
    }

    /// Sets the batch size (values below 1 are clamped to 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Sets the delay between batches.
    #[must_use]
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// Sets the wiki server URL used to absolutize relative thumbnail URLs.
    #[must_use]
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = Some(server_url.into());
        self
    }

    /// Runs the workflow for one index.
    ///
    /// # Errors
    ///
    /// Fails only when page discovery or image resolution fails; per-page
    /// OCR and save failures are collected in the report instead.
    #[instrument(skip(self, notifier))]
    pub async fn run(
        &self,
        index_title: &str,
        notifier: &dyn Notifier,
    ) -> Result<BulkOcrReport, OcrError> {
        notifier.notify(Notice::InProgress);

        // Stage 1: discover untranscribed pages in the window.
        let pages = match self.api.pages_in_index(index_title).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(error = %e, "page discovery failed");
                notifier.notify(Notice::FetchPagesFailed);
                return Err(e);
            }
        };
        let untranscribed: Vec<String> = pages
            .into_iter()
            .skip(self.start_index)
            .take(self.page_count.unwrap_or(usize::MAX))
            .filter(super::api::IndexPage::is_untranscribed)
            .map(|p| p.title)
            .collect();

        info!(
            index = index_title,
            untranscribed = untranscribed.len(),
            "discovered pages"
        );
        if untranscribed.is_empty() {
            notifier.notify(Notice::NoPagesFound);
            return Ok(BulkOcrReport::default());
        }

        // Stage 2: resolve scan images. Nothing has been mutated yet, so a
        // failure here simply aborts.
        let images = match self.api.images_for_index(index_title).await {
            Ok(images) => images,
            Err(e) => {
                warn!(error = %e, "image resolution failed");
                notifier.notify(Notice::FetchImagesFailed);
                return Err(e);
            }
        };
        let mut thumbnails: HashMap<String, String> = HashMap::new();
        for image in images {
            if let Some(thumbnail) = image.thumbnail {
                thumbnails.insert(image.title, thumbnail);
            }
        }
        // Keep discovery order; drop pages without a resolvable image.
        let work_list: Vec<(String, String)> = untranscribed
            .iter()
            .filter_map(|title| {
                thumbnails
                    .get(title)
                    .map(|thumb| (title.clone(), self.absolute_image_url(thumb)))
            })
            .collect();

        let mut report = BulkOcrReport {
            discovered: untranscribed.len(),
            ..BulkOcrReport::default()
        };

        // Stage 3: OCR in batches.
        let (dictionary, ocr_failures) = self.ocr_batches(&work_list, notifier).await;
        report.transcribed = dictionary.len();
        report.ocr_failures = ocr_failures;

        // Stage 4: save in batches, create-only.
        let (saved, save_failures) = self.save_batches(&dictionary, notifier).await;
        report.saved = saved;
        report.save_failures = save_failures;

        notifier.notify(Notice::Completed {
            saved: report.saved.len(),
            failed: report.save_failures.clone(),
        });
        Ok(report)
    }

    /// OCRs the work list in batches; returns (title → text pairs, failed
    /// titles). Batch members run concurrently; batches are sequential with
    /// a fixed delay between them.
    async fn ocr_batches(
        &self,
        work_list: &[(String, String)],
        notifier: &dyn Notifier,
    ) -> (Vec<(String, String)>, Vec<String>) {
        let total = work_list.len();
        notifier.notify(Notice::OcrProgress { done: 0, total });

        let processed = AtomicUsize::new(0);
        let mut dictionary = Vec::new();
        let mut failures = Vec::new();

        for (batch_index, batch) in work_list.chunks(self.batch_size).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }
            debug!(batch = batch_index, size = batch.len(), "OCR batch");

            let futures = batch.iter().map(|(title, image)| {
                let processed = &processed;
                async move {
                    let result = self
                        .tool
                        .extract_text(image, self.engine, &self.langs, &self.uselang)
                        .await;
                    let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    if result.is_err() {
                        notifier.notify(Notice::OcrPageFailed {
                            title: title.clone(),
                        });
                    }
                    notifier.notify(Notice::OcrProgress { done, total });
                    (title.clone(), result)
                }
            });

            for (title, result) in join_all(futures).await {
                match result {
                    Ok(text) => dictionary.push((title, text)),
                    Err(e) => {
                        warn!(title, error = %e, "OCR failed for page");
                        failures.push(title);
                    }
                }
            }
        }
        (dictionary, failures)
    }

    /// Saves the dictionary in batches with create-only edits; returns
    /// (saved titles, failed titles). A failed save never halts the run.
    async fn save_batches(
        &self,
        dictionary: &[(String, String)],
        notifier: &dyn Notifier,
    ) -> (Vec<String>, Vec<String>) {
        let total = dictionary.len();
        notifier.notify(Notice::SaveProgress {
            saved: 0,
            total,
            failed: Vec::new(),
        });

        let saved_count = AtomicUsize::new(0);
        let failed_titles: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let mut saved = Vec::new();

        for (batch_index, batch) in dictionary.chunks(self.batch_size).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }
            debug!(batch = batch_index, size = batch.len(), "save batch");

            let futures = batch.iter().map(|(title, text)| {
                let saved_count = &saved_count;
                let failed_titles = &failed_titles;
                async move {
                    match self.api.create_page(title, text).await {
                        Ok(()) => {
                            let done = saved_count.fetch_add(1, Ordering::SeqCst) + 1;
                            notifier.notify(Notice::SaveProgress {
                                saved: done,
                                total,
                                failed: snapshot(failed_titles),
                            });
                            Some(title.clone())
                        }
                        Err(e) => {
                            warn!(title, error = %e, "save failed for page");
                            if let Ok(mut failed) = failed_titles.lock() {
                                failed.push(title.clone());
                            }
                            notifier.notify(Notice::SaveProgress {
                                saved: saved_count.load(Ordering::SeqCst),
                                total,
                                failed: snapshot(failed_titles),
                            });
                            None
                        }
                    }
                }
            });

            saved.extend(join_all(futures).await.into_iter().flatten());
        }

        let failed = failed_titles.into_inner().unwrap_or_default();
        (saved, failed)
    }

    /// Absolutizes a thumbnail URL: protocol-relative URLs get `https`,
    /// server-relative paths get the configured server prefix.
    fn absolute_image_url(&self, thumbnail: &str) -> String {
        if thumbnail.starts_with("//") {
            return format!("https:{thumbnail}");
        }
        if thumbnail.starts_with('/') {
            if let Some(server) = &self.server_url {
                return format!("{}{thumbnail}", server.trim_end_matches('/'));
            }
        }
        thumbnail.to_string()
    }
}

fn snapshot(titles: &Mutex<Vec<String>>) -> Vec<String> {
    titles.lock().map(|t| t.clone()).unwrap_or_default()
}
