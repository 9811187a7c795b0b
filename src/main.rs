//! CLI entry point for the wstools toolkit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use wstools_core::wikibase::{
    EditionLookup, EntityLookup, ItemId, LookupError, PropertyId, RecordingUsageAccumulator,
    SitelinkPropagator, StaticBadgeDisplay, StaticEntityLookup, StaticSiteDirectory,
    UsageAccumulator, UsageRecord,
};
use wstools_core::{BulkOcr, ExportUrlBuilder, MwApiClient, OcrTool};

mod cli;
mod notify;

use cli::{Args, BulkOcrArgs, Command, EditionArgs, ExportUrlArgs, SitelinksArgs};
use notify::ProgressNotifier;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match args.command {
        Command::ExportUrl(export) => run_export_url(&export),
        Command::Works(edition) => run_edition_lookup(&edition, Direction::Works),
        Command::Editions(edition) => run_edition_lookup(&edition, Direction::Editions),
        Command::Sitelinks(sitelinks) => run_sitelinks(&sitelinks),
        Command::BulkOcr(bulk) => run_bulk_ocr(&bulk, args.quiet).await,
    }
}

fn run_export_url(args: &ExportUrlArgs) -> Result<()> {
    let builder = ExportUrlBuilder::new(&args.content_language, &args.base_url, &args.server_name);
    debug!(lang = builder.language(), "derived export language");

    match &args.format {
        Some(format) => println!("{}", builder.export_url(&args.title, Some(format))),
        None => {
            for link in builder.sidebar_links(&args.title) {
                println!("{}\t{}", link.id, link.href);
            }
        }
    }
    Ok(())
}

enum Direction {
    Works,
    Editions,
}

fn run_edition_lookup(args: &EditionArgs, direction: Direction) -> Result<()> {
    let item_id: ItemId = args.item.parse()?;
    let entities = load_entities(args)?;
    let usage = Arc::new(RecordingUsageAccumulator::new());
    let lookup = EditionLookup::new(
        Arc::clone(&entities) as Arc<dyn EntityLookup>,
        args.edition_property.parse::<PropertyId>()?,
        args.edition_of_property.parse::<PropertyId>()?,
        Arc::clone(&usage) as Arc<dyn UsageAccumulator>,
    );

    let resolved = match direction {
        Direction::Works => lookup.get_works_by_id(&item_id),
        Direction::Editions => match entities.get_item(&item_id) {
            Ok(item) => lookup.get_editions(&item),
            Err(LookupError::NotFound { .. }) => Vec::new(),
        },
    };

    if resolved.is_empty() {
        info!(item = %item_id, "no linked items found");
    }
    for item in &resolved {
        println!("{}", item.id());
    }
    print_usages(&usage.records());
    Ok(())
}

fn run_sitelinks(args: &SitelinksArgs) -> Result<()> {
    let item_id: ItemId = args.item.parse()?;
    let entities: Arc<StaticEntityLookup> = {
        let raw = std::fs::read_to_string(&args.entities)
            .with_context(|| format!("failed to read {}", args.entities.display()))?;
        Arc::new(StaticEntityLookup::from_json_str(&raw)?)
    };
    let sites = {
        let raw = std::fs::read_to_string(&args.sites)
            .with_context(|| format!("failed to read {}", args.sites.display()))?;
        Arc::new(StaticSiteDirectory::from_json_str(&raw)?)
    };

    let usage = Arc::new(RecordingUsageAccumulator::new());
    let lookup = EditionLookup::new(
        entities as Arc<dyn EntityLookup>,
        args.edition_property.parse::<PropertyId>()?,
        args.edition_of_property.parse::<PropertyId>()?,
        Arc::clone(&usage) as Arc<dyn UsageAccumulator>,
    );
    let propagator = SitelinkPropagator::new(
        lookup,
        sites,
        Arc::new(StaticBadgeDisplay::new()),
        Arc::clone(&usage) as Arc<dyn UsageAccumulator>,
        args.allowed_sites.clone(),
    );

    let mut sidebar = wstools_core::wikibase::Sidebar::new();
    propagator.add_to_sidebar(&item_id, &mut sidebar);

    println!("{}", serde_json::to_string_pretty(&sidebar)?);
    print_usages(&usage.records());
    Ok(())
}

async fn run_bulk_ocr(args: &BulkOcrArgs, quiet: bool) -> Result<()> {
    let mut workflow = BulkOcr::new(MwApiClient::new(&args.api_url), OcrTool::new(&args.tool_url))
        .with_engine(args.engine)
        .with_langs(args.langs.clone())
        .with_uselang(&args.uselang)
        .with_window(args.start, args.count)
        .with_batch_size(usize::from(args.batch_size))
        .with_batch_delay(Duration::from_millis(args.delay));
    // Relative image URLs resolve against the wiki server; without an
    // explicit --server-url, derive it from the api.php URL.
    match &args.server_url {
        Some(server_url) => workflow = workflow.with_server_url(server_url),
        None => {
            if let Some(server_url) = server_from_api_url(&args.api_url) {
                workflow = workflow.with_server_url(server_url);
            }
        }
    }

    info!(index = args.index, engine = %args.engine, "starting bulk OCR");
    let notifier = ProgressNotifier::new(!quiet);
    let report = workflow.run(&args.index, &notifier).await?;
    notifier.finish();

    println!(
        "discovered {}  transcribed {}  saved {}",
        report.discovered,
        report.transcribed,
        report.saved.len()
    );
    for title in &report.ocr_failures {
        println!("ocr failed\t{title}");
    }
    for title in &report.save_failures {
        println!("save failed\t{title}");
    }
    Ok(())
}

fn server_from_api_url(api_url: &str) -> Option<String> {
    let parsed = url::Url::parse(api_url).ok()?;
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) => Some(format!("{}://{host}:{port}", parsed.scheme())),
        None => Some(format!("{}://{host}", parsed.scheme())),
    }
}

fn load_entities(args: &EditionArgs) -> Result<Arc<StaticEntityLookup>> {
    let raw = std::fs::read_to_string(&args.entities)
        .with_context(|| format!("failed to read {}", args.entities.display()))?;
    let lookup = StaticEntityLookup::from_json_str(&raw)?;
    debug!(items = lookup.len(), "entities loaded");
    Ok(Arc::new(lookup))
}

fn print_usages(records: &[UsageRecord]) {
    for record in records {
        match record {
            UsageRecord::Statement(item, property) => {
                println!("usage\tstatement\t{item}\t{property}");
            }
            UsageRecord::Sitelinks(item) => println!("usage\tsitelinks\t{item}"),
        }
    }
}
