//! CLI argument definitions using clap derive macros.

use clap::{Parser, Subcommand};

use wstools_core::config::{
    DEFAULT_EDITION_OF_PROPERTY, DEFAULT_EDITION_PROPERTY, DEFAULT_EXPORT_BASE_URL,
};
use wstools_core::OcrEngine;

/// Wikisource maintenance toolkit.
///
/// wstools builds WS Export URLs, resolves edition/work relations over
/// Wikibase entity dumps, propagates sitelinks, and runs batched bulk OCR
/// over ProofreadPage indexes.
#[derive(Parser, Debug)]
#[command(name = "wstools")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build WS Export tool URLs for a page title
    ExportUrl(ExportUrlArgs),
    /// Resolve the work items of an edition item
    Works(EditionArgs),
    /// Resolve the edition items of a work item
    Editions(EditionArgs),
    /// Build the other-projects sidebar for an edition item
    Sitelinks(SitelinksArgs),
    /// Run bulk OCR over the untranscribed pages of an index
    BulkOcr(BulkOcrArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExportUrlArgs {
    /// Page title to export
    pub title: String,

    /// Export format (epub-3, mobi, pdf-a4); omit for all sidebar links
    #[arg(short, long)]
    pub format: Option<String>,

    /// Base URL of the export tool
    #[arg(long, default_value = DEFAULT_EXPORT_BASE_URL)]
    pub base_url: String,

    /// Server hostname the language code is derived from
    #[arg(long, default_value = "en.wikisource.org")]
    pub server_name: String,

    /// Content language used when the hostname is not a Wikisource one
    #[arg(long, default_value = "en")]
    pub content_language: String,
}

#[derive(clap::Args, Debug)]
pub struct EditionArgs {
    /// Item id to resolve, e.g. Q123
    pub item: String,

    /// Entity JSON file (array of Wikibase entity objects)
    #[arg(short, long)]
    pub entities: std::path::PathBuf,

    /// Property linking a work to its editions
    #[arg(long, default_value = DEFAULT_EDITION_PROPERTY)]
    pub edition_property: String,

    /// Property linking an edition to its work
    #[arg(long, default_value = DEFAULT_EDITION_OF_PROPERTY)]
    pub edition_of_property: String,
}

#[derive(clap::Args, Debug)]
pub struct SitelinksArgs {
    /// Edition item id, e.g. Q123
    pub item: String,

    /// Entity JSON file (array of Wikibase entity objects)
    #[arg(short, long)]
    pub entities: std::path::PathBuf,

    /// Site directory JSON file (array of site records)
    #[arg(short, long)]
    pub sites: std::path::PathBuf,

    /// Site ids to include in the sidebar (repeatable)
    #[arg(short = 'a', long = "allow")]
    pub allowed_sites: Vec<String>,

    /// Property linking a work to its editions
    #[arg(long, default_value = DEFAULT_EDITION_PROPERTY)]
    pub edition_property: String,

    /// Property linking an edition to its work
    #[arg(long, default_value = DEFAULT_EDITION_OF_PROPERTY)]
    pub edition_of_property: String,
}

#[derive(clap::Args, Debug)]
pub struct BulkOcrArgs {
    /// Index title, e.g. "Index:Novel.djvu"
    pub index: String,

    /// MediaWiki api.php URL of the wiki
    #[arg(long)]
    pub api_url: String,

    /// Base URL of the OCR tool
    #[arg(long, default_value = "https://ocr.wmcloud.org")]
    pub tool_url: String,

    /// OCR engine
    #[arg(short, long, default_value_t = OcrEngine::Tesseract)]
    pub engine: OcrEngine,

    /// OCR language codes (repeatable)
    #[arg(short, long = "lang")]
    pub langs: Vec<String>,

    /// Interface language forwarded to the tool
    #[arg(long, default_value = "en")]
    pub uselang: String,

    /// Wiki server URL used to absolutize relative image URLs
    #[arg(long)]
    pub server_url: Option<String>,

    /// First page of the window within the index (0-based)
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Number of pages to process; omit for the whole index
    #[arg(long)]
    pub count: Option<usize>,

    /// Pages per batch (1-50)
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=50))]
    pub batch_size: u8,

    /// Delay between batches in milliseconds (max 60000)
    #[arg(short = 'd', long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_export_url_defaults() {
        let args = Args::try_parse_from(["wstools", "export-url", "Lorem"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        let Command::ExportUrl(export) = args.command else {
            panic!("expected export-url");
        };
        assert_eq!(export.title, "Lorem");
        assert!(export.format.is_none());
        assert_eq!(export.base_url, DEFAULT_EXPORT_BASE_URL);
        assert_eq!(export.server_name, "en.wikisource.org");
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["wstools", "-v", "export-url", "Lorem"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["wstools", "export-url", "Lorem", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["wstools", "-q", "export-url", "Lorem"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_missing_subcommand_is_an_error() {
        let result = Args::try_parse_from(["wstools"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_works_parses_properties() {
        let args = Args::try_parse_from([
            "wstools",
            "works",
            "Q1",
            "--entities",
            "entities.json",
            "--edition-of-property",
            "P1234",
        ])
        .unwrap();
        let Command::Works(works) = args.command else {
            panic!("expected works");
        };
        assert_eq!(works.item, "Q1");
        assert_eq!(works.edition_property, DEFAULT_EDITION_PROPERTY);
        assert_eq!(works.edition_of_property, "P1234");
    }

    #[test]
    fn test_cli_sitelinks_collects_allow_list() {
        let args = Args::try_parse_from([
            "wstools",
            "sitelinks",
            "Q1",
            "--entities",
            "entities.json",
            "--sites",
            "sites.json",
            "-a",
            "enwiki",
            "-a",
            "frwiki",
        ])
        .unwrap();
        let Command::Sitelinks(sitelinks) = args.command else {
            panic!("expected sitelinks");
        };
        assert_eq!(sitelinks.allowed_sites, vec!["enwiki", "frwiki"]);
    }

    #[test]
    fn test_cli_bulk_ocr_defaults() {
        let args = Args::try_parse_from([
            "wstools",
            "bulk-ocr",
            "Index:Novel.djvu",
            "--api-url",
            "https://en.wikisource.org/w/api.php",
        ])
        .unwrap();
        let Command::BulkOcr(bulk) = args.command else {
            panic!("expected bulk-ocr");
        };
        assert_eq!(bulk.engine, OcrEngine::Tesseract);
        assert_eq!(bulk.batch_size, 10);
        assert_eq!(bulk.delay, 1000);
        assert_eq!(bulk.start, 0);
        assert!(bulk.count.is_none());
        assert!(bulk.langs.is_empty());
    }

    #[test]
    fn test_cli_bulk_ocr_engine_parses() {
        let args = Args::try_parse_from([
            "wstools",
            "bulk-ocr",
            "Index:Novel.djvu",
            "--api-url",
            "https://w/api.php",
            "-e",
            "google",
        ])
        .unwrap();
        let Command::BulkOcr(bulk) = args.command else {
            panic!("expected bulk-ocr");
        };
        assert_eq!(bulk.engine, OcrEngine::Google);
    }

    #[test]
    fn test_cli_bulk_ocr_unknown_engine_rejected() {
        let result = Args::try_parse_from([
            "wstools",
            "bulk-ocr",
            "Index:Novel.djvu",
            "--api-url",
            "https://w/api.php",
            "-e",
            "abbyy",
        ]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_bulk_ocr_batch_size_zero_rejected() {
        let result = Args::try_parse_from([
            "wstools",
            "bulk-ocr",
            "Index:Novel.djvu",
            "--api-url",
            "https://w/api.php",
            "-b",
            "0",
        ]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_bulk_ocr_delay_over_max_rejected() {
        let result = Args::try_parse_from([
            "wstools",
            "bulk-ocr",
            "Index:Novel.djvu",
            "--api-url",
            "https://w/api.php",
            "-d",
            "60001",
        ]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["wstools", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["wstools", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
