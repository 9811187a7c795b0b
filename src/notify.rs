//! Progress UI (spinner) for bulk OCR runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use wstools_core::{Notice, Notifier};

/// Renders [`Notice`]s as a live spinner line. With the spinner disabled
/// (quiet mode) notices go to the log only.
pub struct ProgressNotifier {
    spinner: Option<ProgressBar>,
}

impl ProgressNotifier {
    /// Creates a notifier; `use_spinner: false` keeps the terminal clean.
    pub fn new(use_spinner: bool) -> Self {
        if !use_spinner {
            return Self { spinner: None };
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self {
            spinner: Some(spinner),
        }
    }

    fn set_message(&self, message: String) {
        match &self.spinner {
            Some(spinner) => spinner.set_message(message),
            None => debug!("{message}"),
        }
    }

    /// Stops and clears the spinner.
    pub fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}

impl Notifier for ProgressNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::InProgress => self.set_message("Discovering pages...".to_string()),
            Notice::NoPagesFound => {
                self.finish();
                info!("no untranscribed pages found");
            }
            Notice::FetchPagesFailed => {
                self.finish();
                warn!("fetching the page list failed");
            }
            Notice::FetchImagesFailed => {
                self.finish();
                warn!("fetching page images failed");
            }
            Notice::OcrPageFailed { title } => warn!(title, "OCR failed"),
            Notice::OcrProgress { done, total } => {
                self.set_message(format!("[{done}/{total}] Running OCR..."));
            }
            Notice::SaveProgress {
                saved,
                total,
                failed,
            } => {
                if failed.is_empty() {
                    self.set_message(format!("[{saved}/{total}] Saving pages..."));
                } else {
                    self.set_message(format!(
                        "[{saved}/{total}] Saving pages (failed: {})...",
                        failed.join(", ")
                    ));
                }
            }
            Notice::Completed { saved, failed } => {
                self.finish();
                info!(saved, failed = failed.len(), "bulk OCR finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_notifier_accepts_all_notices() {
        let notifier = ProgressNotifier::new(false);
        notifier.notify(Notice::InProgress);
        notifier.notify(Notice::OcrProgress { done: 1, total: 2 });
        notifier.notify(Notice::Completed {
            saved: 1,
            failed: vec!["Page:X/1".to_string()],
        });
        notifier.finish();
    }
}
