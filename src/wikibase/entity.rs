//! Wikibase entity data model.
//!
//! Covers exactly the slice of the Wikibase data model the toolkit needs:
//! item/property ids, statements with ranks and main snaks, and sitelinks.
//! Entities deserialize from the standard Wikibase entity JSON shape
//! (`claims` / `mainsnak` / `datavalue` / `sitelinks`), so entity dumps and
//! `wbgetentities` payloads both load directly.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing an entity or property id fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind} id: {value}")]
pub struct IdParseError {
    /// Expected id kind ("item" or "property").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

fn validate_id(value: &str, prefix: char, kind: &'static str) -> Result<(), IdParseError> {
    let mut chars = value.chars();
    let valid = chars.next() == Some(prefix)
        && !value[1..].is_empty()
        && value[1..].bytes().all(|b| b.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(IdParseError {
            kind,
            value: value.to_string(),
        })
    }
}

/// Identifier of a Wikibase item, e.g. `Q123`. Equality by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Parses an item id of the form `Q<digits>`.
    ///
    /// # Errors
    ///
    /// Returns [`IdParseError`] if the input is not a well-formed item id.
    pub fn new(value: impl Into<String>) -> Result<Self, IdParseError> {
        let value = value.into();
        validate_id(&value, 'Q', "item")?;
        Ok(Self(value))
    }

    /// The serialized form, e.g. `"Q123"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a Wikibase property, e.g. `P629`. Equality by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyId(String);

impl PropertyId {
    /// Parses a property id of the form `P<digits>`.
    ///
    /// # Errors
    ///
    /// Returns [`IdParseError`] if the input is not a well-formed property id.
    pub fn new(value: impl Into<String>) -> Result<Self, IdParseError> {
        let value = value.into();
        validate_id(&value, 'P', "property")?;
        Ok(Self(value))
    }

    /// The serialized form, e.g. `"P629"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PropertyId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PropertyId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PropertyId> for String {
    fn from(id: PropertyId) -> Self {
        id.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Statement rank. Best-statement selection prefers `Preferred` over
/// `Normal` and always excludes `Deprecated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    /// Statement known to be wrong or outdated.
    Deprecated,
    /// Default rank.
    Normal,
    /// Statement singled out as the best available.
    Preferred,
}

/// The concrete value carried by a value snak.
#[derive(Debug, Clone, PartialEq)]
pub enum SnakValue {
    /// An entity-id value referencing an item.
    Item(ItemId),
    /// Any other datavalue (string, quantity, a property-entity reference,
    /// ...). Carried opaquely; never yields an item reference.
    Other(serde_json::Value),
}

/// A statement's main snak.
#[derive(Debug, Clone, PartialEq)]
pub enum Snak {
    /// A snak carrying a concrete value.
    Value(SnakValue),
    /// "Unknown value" - no usable result.
    SomeValue,
    /// "No value" - no usable result.
    NoValue,
}

impl Snak {
    /// Returns the referenced item id if this is a value snak holding an
    /// entity-id value that points at an item.
    #[must_use]
    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            Snak::Value(SnakValue::Item(id)) => Some(id),
            _ => None,
        }
    }
}

/// A statement attached to an item: property, rank, and main snak.
///
/// Qualifiers and references are not modeled; nothing here consumes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The statement's property.
    pub property: PropertyId,
    /// The statement's rank.
    pub rank: Rank,
    /// The main snak.
    pub main_snak: Snak,
}

impl Statement {
    /// Creates a normal-rank value statement pointing at an item. Test and
    /// fixture convenience.
    #[must_use]
    pub fn item_value(property: PropertyId, target: ItemId) -> Self {
        Self {
            property,
            rank: Rank::Normal,
            main_snak: Snak::Value(SnakValue::Item(target)),
        }
    }

    /// Returns a copy of this statement with the given rank.
    #[must_use]
    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }
}

/// A sitelink: a link from an item to a page on an affiliated wiki.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteLink {
    /// Global site id, e.g. `enwiki`.
    pub site: String,
    /// Page title on that site.
    pub title: String,
    /// Badge item ids (e.g. featured-article markers).
    #[serde(default)]
    pub badges: Vec<ItemId>,
}

impl SiteLink {
    /// Creates a badge-less sitelink.
    #[must_use]
    pub fn new(site: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            title: title.into(),
            badges: Vec::new(),
        }
    }
}

/// A Wikibase item: id, statements, and sitelinks keyed by site id.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    statements: Vec<Statement>,
    sitelinks: BTreeMap<String, SiteLink>,
}

impl Item {
    /// Creates an empty item.
    #[must_use]
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            statements: Vec::new(),
            sitelinks: BTreeMap::new(),
        }
    }

    /// Appends a statement (builder style).
    #[must_use]
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Adds a sitelink (builder style). Replaces an existing link for the
    /// same site.
    #[must_use]
    pub fn with_sitelink(mut self, sitelink: SiteLink) -> Self {
        self.sitelinks.insert(sitelink.site.clone(), sitelink);
        self
    }

    /// The item's id.
    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// All statements, in source order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Sitelinks keyed by site id.
    #[must_use]
    pub fn sitelinks(&self) -> &BTreeMap<String, SiteLink> {
        &self.sitelinks
    }

    /// Selects the best statements for a property: preferred-rank statements
    /// if any exist, otherwise normal-rank ones. Deprecated statements are
    /// always excluded. Source order is preserved.
    #[must_use]
    pub fn best_statements(&self, property: &PropertyId) -> Vec<&Statement> {
        let group: Vec<&Statement> = self
            .statements
            .iter()
            .filter(|s| &s.property == property)
            .collect();
        let has_preferred = group.iter().any(|s| s.rank == Rank::Preferred);
        let wanted = if has_preferred {
            Rank::Preferred
        } else {
            Rank::Normal
        };
        group.into_iter().filter(|s| s.rank == wanted).collect()
    }
}

// ==================== Wikibase entity JSON ====================

/// Raw entity as serialized by Wikibase (`claims`, `sitelinks`).
#[derive(Debug, Deserialize)]
struct RawEntity {
    id: ItemId,
    #[serde(default)]
    claims: BTreeMap<PropertyId, Vec<RawStatement>>,
    #[serde(default)]
    sitelinks: BTreeMap<String, SiteLink>,
}

#[derive(Debug, Deserialize)]
struct RawStatement {
    mainsnak: RawSnak,
    #[serde(default = "default_rank")]
    rank: Rank,
}

fn default_rank() -> Rank {
    Rank::Normal
}

#[derive(Debug, Deserialize)]
struct RawSnak {
    snaktype: String,
    #[serde(default)]
    datavalue: Option<RawDataValue>,
}

#[derive(Debug, Deserialize)]
struct RawDataValue {
    #[serde(rename = "type")]
    value_type: String,
    value: serde_json::Value,
}

impl From<RawSnak> for Snak {
    fn from(raw: RawSnak) -> Self {
        match raw.snaktype.as_str() {
            "value" => match raw.datavalue {
                Some(dv) => Snak::Value(dv.into()),
                // A value snak without a datavalue is malformed; treat it as
                // carrying an unusable value rather than failing the entity.
                None => Snak::Value(SnakValue::Other(serde_json::Value::Null)),
            },
            "novalue" => Snak::NoValue,
            _ => Snak::SomeValue,
        }
    }
}

impl From<RawDataValue> for SnakValue {
    fn from(raw: RawDataValue) -> Self {
        if raw.value_type == "wikibase-entityid" {
            let id = raw
                .value
                .get("id")
                .and_then(serde_json::Value::as_str)
                .and_then(|id| ItemId::new(id).ok());
            if let Some(id) = id {
                return SnakValue::Item(id);
            }
        }
        SnakValue::Other(raw.value)
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawEntity::deserialize(deserializer)?;
        let mut statements = Vec::new();
        for (property, group) in raw.claims {
            for statement in group {
                statements.push(Statement {
                    property: property.clone(),
                    rank: statement.rank,
                    main_snak: statement.mainsnak.into(),
                });
            }
        }
        Ok(Item {
            id: raw.id,
            statements,
            sitelinks: raw.sitelinks,
        })
    }
}
