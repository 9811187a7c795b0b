//! Sitelink propagation from work items to edition pages.
//!
//! A Wikisource page is usually connected to an *edition* item, whose
//! sitelinks only cover other editions. The links readers actually want
//! (Wikipedia article, Wikiquote page, ...) live on the *work* item. The
//! [`SitelinkPropagator`] follows the edition → work hop and merges the
//! work's sitelinks into the caller's collection - either a flat map keyed
//! by site id, or a skin sidebar grouped by site group - without ever
//! overwriting an entry that is already there.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::edition::EditionLookup;
use super::entity::{Item, ItemId, SiteLink};
use super::lookup::UsageAccumulator;
use crate::export::encode_title;

/// Metadata for one affiliated site, as supplied by the site directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Global site id, e.g. `enwiki`.
    pub global_id: String,
    /// Site group, e.g. `wikipedia`.
    pub group: String,
    /// Content language of the site, when it has one.
    #[serde(default)]
    pub language_code: Option<String>,
    /// Page URL template with a `$1` placeholder for the encoded title,
    /// e.g. `https://en.wikipedia.org/wiki/$1`.
    pub page_url_template: String,
}

impl Site {
    /// Expands the page URL template for a page name.
    #[must_use]
    pub fn page_url(&self, page_name: &str) -> String {
        self.page_url_template
            .replace("$1", &encode_title(page_name))
    }
}

/// Directory resolving site ids to site metadata.
pub trait SiteDirectory: Send + Sync {
    /// Returns the site for a global site id, or `None` when unknown.
    fn get_site(&self, site_id: &str) -> Option<Site>;
}

/// In-memory [`SiteDirectory`], loadable from a JSON map of site id → site.
#[derive(Debug, Default)]
pub struct StaticSiteDirectory {
    sites: HashMap<String, Site>,
}

impl StaticSiteDirectory {
    /// Creates a directory over the given sites, keyed by their global ids.
    #[must_use]
    pub fn from_sites(sites: impl IntoIterator<Item = Site>) -> Self {
        Self {
            sites: sites
                .into_iter()
                .map(|site| (site.global_id.clone(), site))
                .collect(),
        }
    }

    /// Loads a directory from a JSON array of site records.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for malformed input.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let sites: Vec<Site> = serde_json::from_str(json)?;
        Ok(Self::from_sites(sites))
    }
}

impl SiteDirectory for StaticSiteDirectory {
    fn get_site(&self, site_id: &str) -> Option<Site> {
        self.sites.get(site_id).cloned()
    }
}

/// Maps sitelink badge items to CSS classes on the rendered link.
pub trait BadgeDisplay: Send + Sync {
    /// Returns the CSS class for a badge item, or `None` to skip it.
    fn badge_class(&self, badge: &ItemId) -> Option<String>;
}

/// [`BadgeDisplay`] over a fixed badge → class table.
#[derive(Debug, Default)]
pub struct StaticBadgeDisplay {
    classes: HashMap<ItemId, String>,
}

impl StaticBadgeDisplay {
    /// Creates an empty display (no badge renders a class).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a badge class (builder style).
    #[must_use]
    pub fn with_badge(mut self, badge: ItemId, class: impl Into<String>) -> Self {
        self.classes.insert(badge, class.into());
        self
    }
}

impl BadgeDisplay for StaticBadgeDisplay {
    fn badge_class(&self, badge: &ItemId) -> Option<String> {
        self.classes.get(badge).cloned()
    }
}

/// Attributes of one sidebar link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarLink {
    /// Message key, `wikibase-otherprojects-<group>`.
    pub msg: String,
    /// Space-joined CSS classes, including one class per recognized badge.
    pub class: String,
    /// Link target.
    pub href: String,
    /// Language of the target page, when the site has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
}

/// Sidebar structure: group id → site global id → link attributes.
pub type Sidebar = BTreeMap<String, BTreeMap<String, SidebarLink>>;

/// Merges a work item's sitelinks into edition-page link collections.
pub struct SitelinkPropagator {
    editions: EditionLookup,
    sites: Arc<dyn SiteDirectory>,
    badges: Arc<dyn BadgeDisplay>,
    usage: Arc<dyn UsageAccumulator>,
    site_ids_to_output: Vec<String>,
}

impl SitelinkPropagator {
    /// Creates a propagator.
    ///
    /// `site_ids_to_output` is the caller-supplied allow-list for the
    /// grouped (sidebar) variant; sitelinks to other sites are skipped.
    #[must_use]
    pub fn new(
        editions: EditionLookup,
        sites: Arc<dyn SiteDirectory>,
        badges: Arc<dyn BadgeDisplay>,
        usage: Arc<dyn UsageAccumulator>,
        site_ids_to_output: Vec<String>,
    ) -> Self {
        Self {
            editions,
            sites,
            badges,
            usage,
            site_ids_to_output,
        }
    }

    /// Merges the work item's sitelinks into a flat site-id-keyed map.
    ///
    /// Existing entries are never overwritten. An edition whose work cannot
    /// be resolved leaves the map untouched.
    pub fn provide_site_links(
        &self,
        item: &Item,
        site_links: &mut BTreeMap<String, SiteLink>,
    ) {
        for work in self.editions.get_works(item) {
            self.usage.add_sitelinks_usage(work.id());
            for sitelink in work.sitelinks().values() {
                if !site_links.contains_key(&sitelink.site) {
                    site_links.insert(sitelink.site.clone(), sitelink.clone());
                }
            }
        }
    }

    /// Merges the work item's sitelinks into a grouped sidebar structure.
    ///
    /// Sitelinks outside the allow-list and sitelinks to sites the directory
    /// cannot resolve are skipped. Existing (group, site) entries are never
    /// overwritten.
    pub fn add_to_sidebar(&self, item_id: &ItemId, sidebar: &mut Sidebar) {
        for work in self.editions.get_works_by_id(item_id) {
            self.add_item_site_links_to_sidebar(&work, sidebar);
        }
    }

    fn add_item_site_links_to_sidebar(&self, item: &Item, sidebar: &mut Sidebar) {
        self.usage.add_sitelinks_usage(item.id());

        for sitelink in item.sitelinks().values() {
            if !self.site_ids_to_output.iter().any(|s| s == &sitelink.site) {
                continue;
            }
            let Some(site) = self.sites.get_site(&sitelink.site) else {
                debug!(site = %sitelink.site, "site not in directory, skipping");
                continue;
            };

            let group = sidebar.entry(site.group.clone()).or_default();
            if !group.contains_key(&site.global_id) {
                let link = self.build_sidebar_link(sitelink, &site);
                group.insert(site.global_id.clone(), link);
            }
        }
    }

    fn build_sidebar_link(&self, sitelink: &SiteLink, site: &Site) -> SidebarLink {
        let mut classes = format!("wb-otherproject-link wb-otherproject-{}", site.group);
        for badge in &sitelink.badges {
            if let Some(class) = self.badges.badge_class(badge) {
                classes.push(' ');
                classes.push_str(&class);
            }
        }
        SidebarLink {
            msg: format!("wikibase-otherprojects-{}", site.group),
            class: classes,
            href: site.page_url(&sitelink.title),
            hreflang: site.language_code.clone(),
        }
    }
}
