//! WS Export tool URL construction and sidebar export links.
//!
//! The WS Export tool lives outside the wiki and is reached purely by URL:
//! it takes a Wikisource language code and a page title and produces an
//! EPUB/MOBI/PDF rendition. [`ExportUrlBuilder`] derives the language code
//! from the wiki's server hostname once at construction and then builds the
//! tool URLs, plus the ordered set of sidebar download links offered on
//! content pages.

use serde::Serialize;

/// Export format identifier for EPUB 3.
pub const FORMAT_EPUB: &str = "epub-3";
/// Export format identifier for MOBI.
pub const FORMAT_MOBI: &str = "mobi";
/// Export format identifier for A4 PDF.
pub const FORMAT_PDF: &str = "pdf-a4";

/// Percent-encodes a page title as a prefixed DB key path segment: spaces
/// become underscores, and the characters MediaWiki leaves readable in URLs
/// (`;:@$!*(),/~` among them) stay literal.
#[must_use]
pub fn encode_title(title: &str) -> String {
    let db_key = title.replace(' ', "_");
    let mut out = String::with_capacity(db_key.len());
    for byte in db_key.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'_'
            | b'.'
            | b'-'
            | b'~'
            | b';'
            | b':'
            | b'@'
            | b'$'
            | b'!'
            | b'*'
            | b'('
            | b')'
            | b','
            | b'/' => out.push(byte as char),
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

/// The page being rendered, reduced to what export gating needs.
#[derive(Debug, Clone, Copy)]
pub struct PageContext {
    /// Namespace id of the page.
    pub namespace: i32,
    /// Whether the page is the wiki's main page.
    pub is_main_page: bool,
    /// Whether the page exists.
    pub exists: bool,
}

/// One sidebar download link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportLink {
    /// Element id, e.g. `wikisource-download-epub`.
    pub id: String,
    /// Message key for the link label.
    pub msg: String,
    /// Link target on the export tool.
    pub href: String,
}

/// Builds URLs for the WS Export tool.
///
/// The Wikisource language code is derived from the server hostname once,
/// here and nowhere else; client code re-deriving it must follow the exact
/// same rules to stay consistent.
#[derive(Debug, Clone)]
pub struct ExportUrlBuilder {
    lang: String,
    base_url: String,
}

impl ExportUrlBuilder {
    /// Creates a builder.
    ///
    /// Language derivation, in order: the multilingual `wikisource.org` maps
    /// to `mul`; a beta-cluster English host maps to `beta`; any
    /// `<code>.wikisource.org` host maps to `<code>`; anything else falls
    /// back to the wiki's configured content language.
    #[must_use]
    pub fn new(content_language: &str, base_url: &str, server_name: &str) -> Self {
        let lang = if server_name == "wikisource.org" {
            "mul".to_string()
        } else if server_name.contains("en.wikisource.beta") {
            "beta".to_string()
        } else if let Some(pos) = server_name.find(".wikisource.org") {
            server_name[..pos].to_string()
        } else {
            content_language.to_string()
        };
        Self {
            lang,
            base_url: base_url.to_string(),
        }
    }

    /// The unmodified configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The derived Wikisource language code.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.lang
    }

    /// Builds an export URL for a title. With a format the tool renders
    /// directly; without one it shows its format chooser.
    #[must_use]
    pub fn export_url(&self, title: &str, format: Option<&str>) -> String {
        let title = encode_title(title);
        match format {
            Some(format) => format!(
                "{}/?format={}&lang={}&page={}",
                self.base_url,
                urlencoding::encode(format),
                self.lang,
                title
            ),
            None => format!("{}/?lang={}&title={}", self.base_url, self.lang, title),
        }
    }

    /// The ordered sidebar download links for a title: EPUB, MOBI, PDF, and
    /// the format chooser.
    #[must_use]
    pub fn sidebar_links(&self, title: &str) -> Vec<ExportLink> {
        [
            ("epub", Some(FORMAT_EPUB)),
            ("mobi", Some(FORMAT_MOBI)),
            ("pdf", Some(FORMAT_PDF)),
            ("choose", None),
        ]
        .into_iter()
        .map(|(name, format)| ExportLink {
            id: format!("wikisource-download-{name}"),
            msg: format!("wikisource-download-{name}"),
            href: self.export_url(title, format),
        })
        .collect()
    }
}

/// Whether export links should be offered for a page: content namespaces
/// only, never the main page, never missing pages.
#[must_use]
pub fn should_offer_export(content_namespaces: &[i32], page: PageContext) -> bool {
    content_namespaces.contains(&page.namespace) && !page.is_main_page && page.exists
}
