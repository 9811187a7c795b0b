//! MediaWiki action API client for the bulk OCR workflow.
//!
//! Three endpoints are used: `list=proofreadpagesinindex` to enumerate the
//! pages of a ProofreadPage index, `prop=imageforpage` (driven by the same
//! list as a generator) to resolve each page's scan image, and
//! `action=edit` with `createonly` to write OCR text back without ever
//! overwriting an existing page.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::error::OcrError;

/// Connect timeout for API requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One page of a ProofreadPage index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPage {
    /// Page id; `0` means the page has not been created yet.
    pub page_id: u64,
    /// Full page title, e.g. `Page:Novel.djvu/12`.
    pub title: String,
}

impl IndexPage {
    /// Whether the page exists as a wiki page yet.
    #[must_use]
    pub fn is_untranscribed(&self) -> bool {
        self.page_id == 0
    }
}

/// A page's scan image, when one could be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Full page title.
    pub title: String,
    /// Thumbnail URL of the scan, when available.
    pub thumbnail: Option<String>,
}

// ==================== API response types ====================

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct PagesInIndexResponse {
    error: Option<ApiErrorBody>,
    query: Option<PagesInIndexQuery>,
}

#[derive(Debug, Deserialize)]
struct PagesInIndexQuery {
    #[serde(default)]
    proofreadpagesinindex: Vec<RawIndexPage>,
}

#[derive(Debug, Deserialize)]
struct RawIndexPage {
    pageid: u64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    error: Option<ApiErrorBody>,
    query: Option<ImagesQuery>,
}

#[derive(Debug, Deserialize)]
struct ImagesQuery {
    #[serde(default)]
    pages: Vec<RawImagePage>,
}

#[derive(Debug, Deserialize)]
struct RawImagePage {
    title: String,
    imagesforpage: Option<ImagesForPage>,
}

#[derive(Debug, Deserialize)]
struct ImagesForPage {
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    error: Option<ApiErrorBody>,
    query: Option<TokenQuery>,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    tokens: Option<Tokens>,
}

#[derive(Debug, Deserialize)]
struct Tokens {
    csrftoken: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditResponse {
    error: Option<ApiErrorBody>,
    edit: Option<EditResult>,
}

#[derive(Debug, Deserialize)]
struct EditResult {
    result: String,
}

// ==================== Client ====================

/// Client for a wiki's `api.php`.
#[derive(Debug, Clone)]
pub struct MwApiClient {
    client: Client,
    api_url: String,
}

impl MwApiClient {
    /// Creates a client for an `api.php` endpoint URL.
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_url: api_url.to_string(),
        }
    }

    /// The configured `api.php` URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Enumerates all pages of a ProofreadPage index, in index order.
    ///
    /// # Errors
    ///
    /// [`OcrError::Http`] on transport failure, [`OcrError::MwApi`] when the
    /// API reports an error.
    #[instrument(skip(self))]
    pub async fn pages_in_index(&self, index_title: &str) -> Result<Vec<IndexPage>, OcrError> {
        let response: PagesInIndexResponse = self
            .get(&[
                ("action", "query"),
                ("list", "proofreadpagesinindex"),
                ("prppiititle", index_title),
                ("prppiiprop", "ids|title"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        if let Some(error) = response.error {
            return Err(OcrError::mw_api(error.code, error.info));
        }
        let pages = response
            .query
            .map(|q| q.proofreadpagesinindex)
            .unwrap_or_default()
            .into_iter()
            .map(|p| IndexPage {
                page_id: p.pageid,
                title: p.title,
            })
            .collect();
        Ok(pages)
    }

    /// Resolves the scan image of every page in an index.
    ///
    /// # Errors
    ///
    /// [`OcrError::Http`] on transport failure, [`OcrError::MwApi`] when the
    /// API reports an error.
    #[instrument(skip(self))]
    pub async fn images_for_index(&self, index_title: &str) -> Result<Vec<PageImage>, OcrError> {
        let response: ImagesResponse = self
            .get(&[
                ("action", "query"),
                ("prop", "imageforpage"),
                ("generator", "proofreadpagesinindex"),
                ("gprppiititle", index_title),
                ("gprppiiprop", "ids|title"),
                ("prppifpprop", "filename|fullsize|responsiveimages"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        if let Some(error) = response.error {
            return Err(OcrError::mw_api(error.code, error.info));
        }
        let images = response
            .query
            .map(|q| q.pages)
            .unwrap_or_default()
            .into_iter()
            .map(|p| PageImage {
                title: p.title,
                thumbnail: p.imagesforpage.and_then(|i| i.thumbnail),
            })
            .collect();
        Ok(images)
    }

    /// Fetches a CSRF token for write operations.
    ///
    /// # Errors
    ///
    /// [`OcrError::Http`] on transport failure, [`OcrError::MwApi`] when the
    /// API reports an error, [`OcrError::BadResponse`] when the token is
    /// missing from an otherwise well-formed response.
    pub async fn csrf_token(&self) -> Result<String, OcrError> {
        let response: TokenResponse = self
            .get(&[
                ("action", "query"),
                ("meta", "tokens"),
                ("type", "csrf"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        if let Some(error) = response.error {
            return Err(OcrError::mw_api(error.code, error.info));
        }
        response
            .query
            .and_then(|q| q.tokens)
            .and_then(|t| t.csrftoken)
            .ok_or_else(|| OcrError::bad_response(&self.api_url, "missing csrf token"))
    }

    /// Creates a page by appending `text`, with create-only semantics: if
    /// the page already exists the API refuses (`articleexists`) and the
    /// existing content stays untouched.
    ///
    /// # Errors
    ///
    /// [`OcrError::Http`] on transport failure, [`OcrError::MwApi`] when the
    /// API reports an error (including `articleexists`).
    #[instrument(skip(self, text))]
    pub async fn create_page(&self, title: &str, text: &str) -> Result<(), OcrError> {
        let token = self.csrf_token().await?;

        let response = self
            .client
            .post(&self.api_url)
            .form(&[
                ("action", "edit"),
                ("title", title),
                ("appendtext", text),
                ("createonly", "1"),
                ("token", token.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| OcrError::http(&self.api_url, e))?;
        let body: EditResponse = response
            .json()
            .await
            .map_err(|e| OcrError::http(&self.api_url, e))?;

        if let Some(error) = body.error {
            return Err(OcrError::mw_api(error.code, error.info));
        }
        match body.edit {
            Some(edit) if edit.result == "Success" => {
                debug!(title, "page created");
                Ok(())
            }
            Some(edit) => Err(OcrError::mw_api("editfailed", edit.result)),
            None => Err(OcrError::bad_response(&self.api_url, "missing edit result")),
        }
    }

    async fn get<T>(&self, params: &[(&str, &str)]) -> Result<T, OcrError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| OcrError::http(&self.api_url, e))?;
        response
            .json()
            .await
            .map_err(|e| OcrError::http(&self.api_url, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_untranscribed_means_zero_page_id() {
        let missing = IndexPage {
            page_id: 0,
            title: "Page:Novel.djvu/1".to_string(),
        };
        let existing = IndexPage {
            page_id: 42,
            title: "Page:Novel.djvu/2".to_string(),
        };
        assert!(missing.is_untranscribed());
        assert!(!existing.is_untranscribed());
    }

    #[test]
    fn test_pages_response_parses() {
        let json = r#"{
            "query": {
                "proofreadpagesinindex": [
                    { "pageid": 0, "title": "Page:Novel.djvu/1" },
                    { "pageid": 7, "title": "Page:Novel.djvu/2" }
                ]
            }
        }"#;
        let parsed: PagesInIndexResponse = serde_json::from_str(json).unwrap();
        let pages = parsed.query.unwrap().proofreadpagesinindex;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].pageid, 0);
    }

    #[test]
    fn test_error_envelope_parses() {
        let json = r#"{ "error": { "code": "badtitle", "info": "Bad title." } }"#;
        let parsed: PagesInIndexResponse = serde_json::from_str(json).unwrap();
        let error = parsed.error.unwrap();
        assert_eq!(error.code, "badtitle");
    }
}
